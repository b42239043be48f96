//! Parses an existing compound file image into a directory model. Mirrors
//! the shape of [`crate::cfb::writer`]: the header, the allocation tables,
//! and the directory stream are each walked once and the results assembled
//! into the same [`Entry`]/path arrays `add` builds.
//!
//! The whole input is held in memory, and two flat lookup tables are built
//! up front — the concatenated FAT and the concatenated MiniFAT — so a
//! chain walk is just repeated indexing, matching
//! [`crate::cfb::fat::entry_at`].

use std::collections::{HashSet, VecDeque};
use std::convert::TryFrom;

use crate::cfb::codec::{decode_filetime, read_i32, read_u16, read_u32, utf16le_to_string};
use crate::cfb::directory::entry::{Backing, Color, Entry, Kind, NOSTREAM};
use crate::cfb::error::CfbError;
use crate::cfb::fat;
use crate::cfb::fat::sector_number::SectorNumber;
use crate::cfb::header::{self, Header};
use crate::cfb::layout::MINI_CUTOFF;

const ZIP_MAGIC: [u8; 2] = [0x50, 0x4b];
const MINI_SECTOR_SIZE: usize = 64;

/// Parses `input` into the flat entry/path arrays `add` would have built,
/// ready to hand to [`crate::cfb::directory::DirectoryModel::from_parts`].
pub(crate) fn parse(input: &[u8]) -> Result<(Vec<Entry>, Vec<String>), CfbError> {
    if input.len() < header::HEADER_LEN {
        return Err(CfbError::TooSmall { actual: input.len() });
    }
    if input[0..2] == ZIP_MAGIC {
        return Err(CfbError::unsupported("Zip contents are not supported"));
    }

    let head = Header::parse(input)?;
    let ssz = head.sector_size;
    let sectors = partition_sectors(input, ssz);

    let fat_addrs = sleuth_fat(&head, &sectors, ssz)?;
    let mut fat_table = Vec::with_capacity(fat_addrs.len() * ssz);
    for addr in &fat_addrs {
        fat_table.extend_from_slice(sector_bytes(&sectors, *addr)?);
    }

    let (_, dir_payload) = walk_chain(head.first_directory_sector_location, &sectors, &fat_table)?;
    let mut entries = read_directory(&dir_payload)?;

    // The root's starting sector only addresses a real mini-stream chain
    // once the mini-stream is non-empty; compliant writers (including this
    // one) leave it pointing at a placeholder sector otherwise, so it must
    // not be dereferenced when size is zero.
    let root = entries.first();
    let mini_stream = match root {
        Some(root) if root.size > 0 && SectorNumber(root.start).is_regular() => {
            walk_chain(SectorNumber(root.start), &sectors, &fat_table)?.1
        }
        _ => Vec::new(),
    };

    let minifat_table = if head.no_of_mini_fat_sectors > 0 {
        walk_chain(head.first_mini_fat_sector_location, &sectors, &fat_table)?.1
    } else {
        Vec::new()
    };

    for entry in entries.iter_mut() {
        if entry.kind != Kind::Stream {
            continue;
        }
        if entry.size == 0 {
            entry.content = Some(Vec::new());
            entry.backing = Some(Backing::MiniFat);
        } else if entry.size >= MINI_CUTOFF {
            entry.backing = Some(Backing::Fat);
            let (_, mut payload) = walk_chain(SectorNumber(entry.start), &sectors, &fat_table)?;
            payload.truncate(entry.size as usize);
            entry.content = Some(payload);
        } else {
            entry.backing = Some(Backing::MiniFat);
            entry.content = Some(extract_minifat_stream(&mini_stream, &minifat_table, entry.start, entry.size)?);
        }
    }

    let full_paths = build_full_paths(&entries);
    Ok((entries, full_paths))
}

fn partition_sectors(input: &[u8], ssz: usize) -> Vec<&[u8]> {
    let body = &input[header::HEADER_LEN..];
    let mut sectors = Vec::with_capacity((body.len() + ssz - 1) / ssz.max(1));
    let mut offset = 0;
    while offset < body.len() {
        let end = (offset + ssz).min(body.len());
        sectors.push(&body[offset..end]);
        offset += ssz;
    }
    sectors
}

fn sector_bytes<'a>(sectors: &[&'a [u8]], idx: SectorNumber) -> Result<&'a [u8], CfbError> {
    sectors
        .get(idx.0 as usize)
        .copied()
        .ok_or_else(|| CfbError::chain_malformed(format!("sector index {} out of range", idx.0)))
}

/// Collects FAT sector addresses: the up-to-109 entries embedded in the
/// header, followed by the DIFAT overflow chain. DIFAT overflow sectors
/// are self-chained via their own trailing pointer, not via the FAT.
fn sleuth_fat(head: &Header, sectors: &[&[u8]], ssz: usize) -> Result<Vec<SectorNumber>, CfbError> {
    let mut addrs: Vec<SectorNumber> = head.difat.iter().copied().take_while(|s| s.0 >= 0).collect();

    let slots_per_sector = ssz / 4 - 1;
    let mut cur = head.first_difat_sector_location;
    let mut remaining = head.no_of_difat_sectors;
    while remaining > 0 {
        if !cur.is_regular() {
            return Err(CfbError::chain_malformed("DIFAT chain ended before no_of_difat_sectors was reached"));
        }
        let sector = sector_bytes(sectors, cur)?;
        for i in 0..slots_per_sector {
            let v = SectorNumber(read_i32(sector, i * 4));
            if v.0 >= 0 {
                addrs.push(v);
            }
        }
        cur = SectorNumber(read_i32(sector, slots_per_sector * 4));
        remaining -= 1;
    }

    if addrs.len() != head.no_of_fat_sectors as usize {
        return Err(CfbError::chain_malformed(format!(
            "DIFAT yielded {} FAT sector addresses, header declares {}",
            addrs.len(),
            head.no_of_fat_sectors
        )));
    }
    Ok(addrs)
}

/// Walks a FAT-resident sector chain from `start`, concatenating the
/// payload of every sector visited.
fn walk_chain(start: SectorNumber, sectors: &[&[u8]], fat_table: &[u8]) -> Result<(Vec<i32>, Vec<u8>), CfbError> {
    let mut seen = HashSet::new();
    let mut nodes = Vec::new();
    let mut payload = Vec::new();
    let mut cur = start;
    while cur.is_regular() {
        if !seen.insert(cur.0) {
            return Err(CfbError::chain_malformed("cycle detected in sector chain"));
        }
        payload.extend_from_slice(sector_bytes(sectors, cur)?);
        nodes.push(cur.0);
        cur = fat::entry_at(fat_table, cur.0);
    }
    Ok((nodes, payload))
}

/// Parses the 128-byte directory entries out of the directory stream's
/// payload. The declared `name_len` is read verbatim and one trailing
/// `U+0000` terminator is stripped, rather than guessing at the real name
/// length some encoders leave ambiguous.
fn read_directory(payload: &[u8]) -> Result<Vec<Entry>, CfbError> {
    let mut entries = Vec::with_capacity(payload.len() / Entry::LENGTH);
    for chunk in payload.chunks(Entry::LENGTH) {
        if chunk.len() < Entry::LENGTH {
            break;
        }
        let name_len = read_u16(chunk, 64) as usize;
        let kind_byte = chunk[66];
        let kind = Kind::try_from(kind_byte).map_err(CfbError::chain_malformed)?;

        if kind == Kind::Unknown {
            entries.push(Entry::new_unknown());
            continue;
        }

        // `name_len` counts the trailing U+0000 terminator; read it
        // verbatim and let `utf16le_to_string` stop at that terminator
        // rather than trusting `name_len - 2` as the real length.
        let name = utf16le_to_string(&chunk[0..name_len.min(64)]);

        let color = Color::try_from(chunk[67]).map_err(CfbError::chain_malformed)?;
        let left = read_i32(chunk, 68);
        let right = read_i32(chunk, 72);
        let child = read_i32(chunk, 76);
        let mut clsid = [0u8; 16];
        clsid.copy_from_slice(&chunk[80..96]);
        let state = read_u32(chunk, 96);
        let created = decode_filetime(&chunk[100..108]);
        let modified = decode_filetime(&chunk[108..116]);
        let start = read_i32(chunk, 116);
        let mut size = read_i32(chunk, 120) as i64;
        if size < 0 && start < 0 {
            size = 0;
        }
        let size = size.max(0) as u64;

        entries.push(Entry {
            name,
            kind,
            color,
            left,
            right,
            child,
            clsid,
            state,
            created,
            modified,
            start,
            size,
            content: None,
            backing: None,
        });
    }
    Ok(entries)
}

/// Extracts a MiniFAT-backed stream: the mini-stream is addressed in
/// 64-byte mini-sectors and the MiniFAT chain gives each mini-index's
/// successor.
fn extract_minifat_stream(mini_stream: &[u8], minifat_table: &[u8], start: i32, size: u64) -> Result<Vec<u8>, CfbError> {
    let mut out = Vec::with_capacity(size as usize);
    let mut remaining = size as i64;
    let mut idx = start;
    let mut seen = HashSet::new();
    while remaining > 0 && idx >= 0 {
        if !seen.insert(idx) {
            return Err(CfbError::chain_malformed("cycle detected in MiniFAT chain"));
        }
        let begin = idx as usize * MINI_SECTOR_SIZE;
        let end = begin + MINI_SECTOR_SIZE;
        if end > mini_stream.len() {
            return Err(CfbError::chain_malformed("MiniFAT mini-sector index out of range"));
        }
        out.extend_from_slice(&mini_stream[begin..end]);
        remaining -= MINI_SECTOR_SIZE as i64;
        idx = fat::entry_at(minifat_table, idx).0;
    }
    out.truncate(size as usize);
    Ok(out)
}

/// Reconstructs full path strings from directory-entry tree links via
/// red-black-tree descent.
fn build_full_paths(entries: &[Entry]) -> Vec<String> {
    let n = entries.len();
    if n == 0 {
        return Vec::new();
    }

    let mut dad: Vec<usize> = vec![0; n];
    let mut has_dad = vec![false; n];
    has_dad[0] = true;
    let mut enqueued = vec![false; n];
    let mut queue: VecDeque<usize> = VecDeque::new();
    queue.push_back(0);
    enqueued[0] = true;

    while let Some(i) = queue.pop_front() {
        let entry = &entries[i];
        if has_dad[i] {
            for link in [entry.left, entry.right] {
                if link != NOSTREAM {
                    let link = link as usize;
                    dad[link] = dad[i];
                    has_dad[link] = true;
                    if !enqueued[link] {
                        enqueued[link] = true;
                        queue.push_back(link);
                    }
                }
            }
        }
        if entry.child != NOSTREAM {
            let child = entry.child as usize;
            dad[child] = i;
            has_dad[child] = true;
            if !enqueued[child] {
                enqueued[child] = true;
                queue.push_back(child);
            }
        }
    }

    let mut segment = vec![String::new(); n];
    for i in 1..n {
        let mut s = entries[i].name.clone();
        if entries[i].is_storage() {
            s.push('/');
        }
        segment[i] = s;
    }

    let mut full = vec![String::new(); n];
    full[0] = "Root Entry/".to_string();
    for i in 1..n {
        let mut path = segment[i].clone();
        let mut d = dad[i];
        while d != 0 {
            path = format!("{}{}", segment[d], path);
            d = dad[d];
        }
        full[i] = format!("/{}", path);
    }
    full
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfb::Cfb;

    #[test]
    fn rejects_short_input() {
        let err = parse(&[0u8; 10]).unwrap_err();
        assert!(matches!(err, CfbError::TooSmall { actual: 10 }));
    }

    #[test]
    fn rejects_zip_magic() {
        let mut input = vec![0x50, 0x4b, 0x03, 0x04];
        input.resize(header::HEADER_LEN, 0);
        let err = parse(&input).unwrap_err();
        assert!(matches!(err, CfbError::UnsupportedFormat { .. }));
    }

    #[test]
    fn round_trips_small_stream() {
        let mut cfb = Cfb::new();
        cfb.add("hello.txt", b"1234".to_vec());
        let bytes = cfb.write();
        let parsed = Cfb::parse(&bytes).unwrap();
        assert_eq!(parsed.full_paths()[2], "/hello.txt");
        assert_eq!(parsed.file_index()[2].content.as_deref(), Some(&b"1234"[..]));
    }

    #[test]
    fn round_trips_large_stream() {
        let mut cfb = Cfb::new();
        let content = vec![b'!'; 7491];
        cfb.add("goodbye.txt", content.clone());
        let bytes = cfb.write();
        let parsed = Cfb::parse(&bytes).unwrap();
        let entry = parsed
            .file_index()
            .iter()
            .find(|e| e.name == "goodbye.txt")
            .expect("stream survives round-trip");
        assert_eq!(entry.content.as_deref(), Some(content.as_slice()));
    }
}
