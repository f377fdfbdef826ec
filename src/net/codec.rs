//! The TPNS binary format.
//!
//! Layout, after the 4-byte `TPNS` magic: a sequence of tagged records
//! terminated by `EON` (`0x7F`). A place record is
//! `BOP id x:u16le y:u16le tokens:u16le (BOA dst_transition)* EOP`; a
//! transition record is `BOT id x:u16le y:u16le (BOA dst_place)* EOT` and
//! carries outgoing arcs only — incoming links are rebuilt from the place
//! records. Arc destinations are raw ids that may point at records appearing
//! later in the stream, so decoding is two-phase: read every record first,
//! then resolve all deferred ids against the populated tables.
use std::fs::File;
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use thiserror::Error;

use crate::net::core::{Network, PLACE_CAPACITY, TRANSITION_CAPACITY};
use crate::net::ids::{PlaceId, TransitionId};
use crate::net::slots::Idx;
use crate::net::structure::{Arc, ArcDirection, IdResolver, Place, Point, Transition};

pub const MAGIC: [u8; 4] = *b"TPNS";

/// Beginning of a place record.
const BOP: u8 = 0x7D;
/// Beginning of a transition record.
const BOT: u8 = 0x7E;
/// End of network.
const EON: u8 = 0x7F;
/// Beginning of an arc sub-record.
const BOA: u8 = 0x70;
/// End of a place record.
const EOP: u8 = 0x71;
/// End of a transition record.
const EOT: u8 = 0x72;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("file not found")]
    NotFound,
    #[error("bad magic: not a TPNS file")]
    BadMagic,
    #[error("malformed TPNS stream: {0}")]
    Malformed(&'static str),
    #[error("read failed: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("cannot create {path:?}: {source}")]
    Create {
        path: PathBuf,
        source: io::Error,
    },
    #[error("write failed: {0}")]
    Io(#[from] io::Error),
}

impl Network {
    /// Serializes the network, places first, ascending id order within each
    /// kind. Arcs flagged for removal or pointing at removed entities are
    /// swept beforehand and never written.
    pub fn encode(&mut self) -> Vec<u8> {
        self.sweep();
        let mut buf = Vec::new();
        write_into(self, &mut buf).expect("writing to a Vec cannot fail");
        buf
    }

    pub fn save_to<P: AsRef<Path>>(&mut self, path: P) -> Result<(), EncodeError> {
        let path = path.as_ref();
        let bytes = self.encode();
        let mut file = File::create(path).map_err(|source| EncodeError::Create {
            path: path.to_owned(),
            source,
        })?;
        file.write_all(&bytes)?;
        log::debug!("saved {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    /// Decodes a network from bytes. Decoding is atomic: any malformed
    /// record means no network at all.
    pub fn decode(bytes: &[u8]) -> Result<Network, DecodeError> {
        decode(bytes)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Network, DecodeError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                DecodeError::NotFound
            } else {
                DecodeError::Io(err)
            }
        })?;
        let net = decode(&bytes)?;
        log::debug!(
            "loaded {} place(s), {} transition(s) from {}",
            net.place_count(),
            net.transition_count(),
            path.display()
        );
        Ok(net)
    }
}

fn write_into<W: Write>(net: &Network, w: &mut W) -> io::Result<()> {
    w.write_all(&MAGIC)?;
    for (id, place) in net.places() {
        w.write_u8(BOP)?;
        w.write_u8(id.raw())?;
        w.write_u16::<LittleEndian>(place.pos.x)?;
        w.write_u16::<LittleEndian>(place.pos.y)?;
        w.write_u16::<LittleEndian>(place.tokens())?;
        for arc in place.arcs() {
            if let Some(dst) = arc.target()
                && net.transition(dst).is_some()
            {
                w.write_u8(BOA)?;
                w.write_u8(dst.raw())?;
            }
        }
        w.write_u8(EOP)?;
    }
    for (id, transition) in net.transitions() {
        w.write_u8(BOT)?;
        w.write_u8(id.raw())?;
        w.write_u16::<LittleEndian>(transition.pos.x)?;
        w.write_u16::<LittleEndian>(transition.pos.y)?;
        for arc in transition.arcs_out() {
            if let Some(dst) = arc.target()
                && net.place(dst).is_some()
            {
                w.write_u8(BOA)?;
                w.write_u8(dst.raw())?;
            }
        }
        w.write_u8(EOT)?;
    }
    w.write_u8(EON)
}

fn read_u8(cursor: &mut Cursor<&[u8]>) -> Result<u8, DecodeError> {
    cursor
        .read_u8()
        .map_err(|_| DecodeError::Malformed("truncated stream"))
}

fn read_u16(cursor: &mut Cursor<&[u8]>) -> Result<u16, DecodeError> {
    cursor
        .read_u16::<LittleEndian>()
        .map_err(|_| DecodeError::Malformed("truncated stream"))
}

fn decode(bytes: &[u8]) -> Result<Network, DecodeError> {
    let mut cursor = Cursor::new(bytes);
    let mut magic = [0u8; 4];
    if cursor.read_exact(&mut magic).is_err() || magic != MAGIC {
        return Err(DecodeError::BadMagic);
    }

    let mut net = Network::new();
    loop {
        match read_u8(&mut cursor)? {
            BOP => {
                let raw = read_u8(&mut cursor)?;
                if raw as usize >= PLACE_CAPACITY {
                    return Err(DecodeError::Malformed("place id out of range"));
                }
                let id = PlaceId::new(raw);
                let place = read_place(&mut cursor, id)?;
                net.places.insert_at(id, place);
            }
            BOT => {
                let raw = read_u8(&mut cursor)?;
                if raw as usize >= TRANSITION_CAPACITY {
                    return Err(DecodeError::Malformed("transition id out of range"));
                }
                let id = TransitionId::new(raw);
                let transition = read_transition(&mut cursor, id)?;
                net.transitions.insert_at(id, transition);
            }
            EON => break,
            _ => return Err(DecodeError::Malformed("unexpected record tag")),
        }
    }

    resolve_deferred(&mut net);
    Ok(net)
}

fn read_place(cursor: &mut Cursor<&[u8]>, id: PlaceId) -> Result<Place, DecodeError> {
    let x = read_u16(cursor)?;
    let y = read_u16(cursor)?;
    let tokens = read_u16(cursor)?;
    let mut place = Place::new(id, Point::new(x, y));
    place.set_tokens(tokens);
    loop {
        match read_u8(cursor)? {
            BOA => {
                let raw = read_u8(cursor)?;
                place
                    .arcs
                    .push(Arc::deferred(ArcDirection::PlaceToTransition, raw));
            }
            EOP => break,
            _ => return Err(DecodeError::Malformed("unexpected byte in place record")),
        }
    }
    Ok(place)
}

fn read_transition(
    cursor: &mut Cursor<&[u8]>,
    id: TransitionId,
) -> Result<Transition, DecodeError> {
    let x = read_u16(cursor)?;
    let y = read_u16(cursor)?;
    let mut transition = Transition::new(id, Point::new(x, y));
    loop {
        match read_u8(cursor)? {
            BOA => {
                let raw = read_u8(cursor)?;
                transition
                    .arcs_out
                    .push(Arc::deferred(ArcDirection::TransitionToPlace, raw));
            }
            EOT => break,
            _ => {
                return Err(DecodeError::Malformed(
                    "unexpected byte in transition record",
                ));
            }
        }
    }
    Ok(transition)
}

/// Occupancy snapshot the resolution pass runs against. A record may
/// legitimately reference one decoded after it, which is why resolution only
/// happens once every record has been read.
struct TableResolver {
    places: [bool; PLACE_CAPACITY],
    transitions: [bool; TRANSITION_CAPACITY],
}

impl TableResolver {
    fn snapshot(net: &Network) -> Self {
        let mut places = [false; PLACE_CAPACITY];
        let mut transitions = [false; TRANSITION_CAPACITY];
        for (id, _) in net.places() {
            places[id.index()] = true;
        }
        for (id, _) in net.transitions() {
            transitions[id.index()] = true;
        }
        Self {
            places,
            transitions,
        }
    }
}

impl IdResolver for TableResolver {
    fn place(&self, raw: u8) -> Option<PlaceId> {
        if (raw as usize) < PLACE_CAPACITY && self.places[raw as usize] {
            Some(PlaceId::new(raw))
        } else {
            None
        }
    }

    fn transition(&self, raw: u8) -> Option<TransitionId> {
        if (raw as usize) < TRANSITION_CAPACITY && self.transitions[raw as usize] {
            Some(TransitionId::new(raw))
        } else {
            None
        }
    }
}

/// Phase two of the load: turn every deferred destination id into a live
/// identifier and rebuild the transitions' incoming-arc views from the place
/// records. An id that resolves to nothing leaves its arc dangling, to be
/// purged on the next sweep.
fn resolve_deferred(net: &mut Network) {
    let resolver = TableResolver::snapshot(net);
    let mut links: Vec<(TransitionId, PlaceId)> = Vec::new();
    for (pid, place) in net.places.iter_mut() {
        for arc in &mut place.arcs {
            arc.resolve(&resolver);
            match arc.target() {
                Some(dst) => links.push((dst, pid)),
                None => log::warn!(
                    "arc from place {pid} references unknown transition {}",
                    arc.raw()
                ),
            }
        }
    }
    for (tid, pid) in links {
        if let Some(transition) = net.transitions.get_mut(tid) {
            transition.link_arc_in(pid);
        }
    }
    for (tid, transition) in net.transitions.iter_mut() {
        for arc in &mut transition.arcs_out {
            arc.resolve(&resolver);
            if arc.target().is_none() {
                log::warn!(
                    "arc from transition {tid} references unknown place {}",
                    arc.raw()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::core::Endpoint;

    fn chain() -> (Network, PlaceId, PlaceId, TransitionId) {
        let mut net = Network::with_seed(11);
        let p0 = net.add_place(1, 2).unwrap();
        let p1 = net.add_place(5, 6).unwrap();
        let t0 = net.add_transition(3, 4).unwrap();
        net.begin_arc(Endpoint::Place(p0));
        net.begin_arc(Endpoint::Transition(t0));
        net.complete_arc();
        net.begin_arc(Endpoint::Transition(t0));
        net.begin_arc(Endpoint::Place(p1));
        net.complete_arc();
        net.add_token(p0).unwrap();
        (net, p0, p1, t0)
    }

    #[test]
    fn encode_produces_the_exact_wire_layout() {
        let (mut net, ..) = chain();
        let expected: Vec<u8> = [
            b"TPNS".as_slice(),
            // place 0 at (1, 2), one token, arc to transition 0
            &[0x7D, 0, 1, 0, 2, 0, 1, 0, 0x70, 0, 0x71],
            // place 1 at (5, 6), no tokens, no arcs
            &[0x7D, 1, 5, 0, 6, 0, 0, 0, 0x71],
            // transition 0 at (3, 4), arc to place 1
            &[0x7E, 0, 3, 0, 4, 0, 0x70, 1, 0x72],
            &[0x7F],
        ]
        .concat();
        assert_eq!(net.encode(), expected);
    }

    #[test]
    fn empty_network_is_magic_plus_terminator() {
        let mut net = Network::new();
        assert_eq!(net.encode(), b"TPNS\x7f");
        let decoded = Network::decode(b"TPNS\x7f").unwrap();
        assert_eq!(decoded.place_count(), 0);
        assert_eq!(decoded.transition_count(), 0);
    }

    #[test]
    fn round_trip_preserves_the_graph() {
        let (mut net, p0, p1, t0) = chain();
        let was_enabled = net.is_enabled(t0);
        let bytes = net.encode();

        let decoded = Network::decode(&bytes).unwrap();
        assert_eq!(decoded.place_count(), 2);
        assert_eq!(decoded.transition_count(), 1);
        assert_eq!(decoded.tokens(p0), Some(1));
        assert_eq!(decoded.tokens(p1), Some(0));
        assert_eq!(
            decoded.transition(t0).unwrap().input_places().collect::<Vec<_>>(),
            [p0]
        );
        assert_eq!(
            decoded.transition(t0).unwrap().output_places().collect::<Vec<_>>(),
            [p1]
        );
        assert_eq!(decoded.is_enabled(t0), was_enabled);
        assert_eq!(decoded.place(p0).unwrap().pos, Point::new(1, 2));
    }

    #[test]
    fn forward_references_resolve_after_all_records() {
        // transition record first, its arc aimed at a place decoded later
        let bytes: Vec<u8> = [
            b"TPNS".as_slice(),
            &[0x7E, 2, 0, 0, 0, 0, 0x70, 4, 0x72],
            &[0x7D, 4, 0, 0, 0, 0, 0, 0, 0x70, 2, 0x71],
            &[0x7F],
        ]
        .concat();
        let net = Network::decode(&bytes).unwrap();
        let t = TransitionId::new(2);
        let p = PlaceId::new(4);
        assert_eq!(net.transition(t).unwrap().output_places().collect::<Vec<_>>(), [p]);
        assert_eq!(net.transition(t).unwrap().input_places().collect::<Vec<_>>(), [p]);
    }

    #[test]
    fn bad_magic_is_rejected() {
        assert!(matches!(
            Network::decode(b"TPNX\x7f"),
            Err(DecodeError::BadMagic)
        ));
        assert!(matches!(Network::decode(b"TP"), Err(DecodeError::BadMagic)));
    }

    #[test]
    fn unexpected_tag_is_malformed() {
        let bytes = [b"TPNS".as_slice(), &[0x55, 0x7F]].concat();
        assert!(matches!(
            Network::decode(&bytes),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn truncation_is_malformed() {
        let (mut net, ..) = chain();
        let bytes = net.encode();
        for cut in 5..bytes.len() - 1 {
            assert!(
                matches!(
                    Network::decode(&bytes[..cut]),
                    Err(DecodeError::Malformed(_))
                ),
                "cut at {cut} should not decode"
            );
        }
    }

    #[test]
    fn out_of_range_record_id_is_malformed() {
        let bytes = [
            b"TPNS".as_slice(),
            &[0x7D, PLACE_CAPACITY as u8, 0, 0, 0, 0, 0, 0, 0x71, 0x7F],
        ]
        .concat();
        assert!(matches!(
            Network::decode(&bytes),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn unresolvable_arc_destination_is_dropped_silently() {
        // place 0 with an arc to transition 9, which does not exist
        let bytes = [
            b"TPNS".as_slice(),
            &[0x7D, 0, 0, 0, 0, 0, 1, 0, 0x70, 9, 0x71, 0x7F],
        ]
        .concat();
        let mut net = Network::decode(&bytes).unwrap();
        assert_eq!(net.place_count(), 1);
        // the dangling arc never enables anything and vanishes on re-encode
        assert!(net.enabled_transitions().is_empty());
        let reencoded = net.encode();
        assert_eq!(
            reencoded,
            [b"TPNS".as_slice(), &[0x7D, 0, 0, 0, 0, 0, 1, 0, 0x71, 0x7F]].concat()
        );
    }

    #[test]
    fn load_from_missing_file_reports_not_found() {
        let missing = std::env::temp_dir().join("tpns-does-not-exist-7f2a.tpns");
        assert!(matches!(
            Network::load_from(&missing),
            Err(DecodeError::NotFound)
        ));
    }

    #[test]
    fn save_then_load_through_the_filesystem() {
        let path = std::env::temp_dir().join("tpns-roundtrip-test.tpns");
        let (mut net, p0, _, t0) = chain();
        net.save_to(&path).unwrap();
        let loaded = Network::load_from(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.tokens(p0), Some(1));
        assert!(loaded.is_enabled(t0));
    }
}
