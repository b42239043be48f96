//! Emits the header, allocation tables, directory, and stream payloads for
//! a finalized (post-`Rebuilder`, post-`LayoutPlanner`) directory model.
//! Always produces a major-version-3 image.

use crate::cfb::codec::{utf16le_padded, write_i32, write_u16, write_u32, zero_filetime};
use crate::cfb::directory::entry::{Entry, Kind, NOSTREAM};
use crate::cfb::fat::chain_pointers;
use crate::cfb::fat::sector_number::SectorNumber;
use crate::cfb::header;
use crate::cfb::layout::{self, Layout};

const SECTOR_SIZE: usize = 512;
const MINI_SECTOR_SIZE: usize = 64;

pub(crate) fn write(entries: &[Entry], layout: &Layout) -> Vec<u8> {
    let mut out = Vec::with_capacity((layout.total_sectors() as usize + 1) * SECTOR_SIZE);

    let fat_locations = build_fat_locations(layout.fat_cnt, layout.difat_cnt);

    write_header(&mut out, layout, &fat_locations);
    debug_assert_eq!(out.len(), header::HEADER_LEN);

    write_difat_overflow(&mut out, &fat_locations, layout.difat_cnt);

    for v in build_fat_entries(entries, layout) {
        write_i32(&mut out, v);
    }

    for v in build_minifat_entries(entries, layout) {
        write_i32(&mut out, v);
    }

    let dir_slots = layout.dir_cnt as usize * 4;
    for i in 0..dir_slots {
        match entries.get(i) {
            Some(entry) => write_directory_entry(&mut out, entry, i == 0),
            None => write_empty_directory_slot(&mut out),
        }
    }

    for entry in entries.iter().filter(|e| e.kind == Kind::Stream && e.size >= layout::MINI_CUTOFF) {
        let offset = (entry.start as usize + 1) * SECTOR_SIZE;
        if out.len() < offset {
            out.resize(offset, 0);
        }
        out.extend_from_slice(entry.content.as_deref().unwrap_or(&[]));
        pad_to(&mut out, SECTOR_SIZE);
    }

    for entry in entries.iter().filter(|e| e.kind == Kind::Stream && e.size > 0 && e.size < layout::MINI_CUTOFF) {
        out.extend_from_slice(entry.content.as_deref().unwrap_or(&[]));
        pad_to(&mut out, MINI_SECTOR_SIZE);
    }

    let total_len = (layout.total_sectors() as usize + 1) * SECTOR_SIZE;
    out.resize(total_len, 0);
    out
}

fn write_header(out: &mut Vec<u8>, layout: &Layout, fat_locations: &[i32]) {
    out.extend_from_slice(&header::SIGNATURE);
    out.extend_from_slice(&[0u8; 16]);
    write_u16(out, header::MINOR_VERSION);
    write_u16(out, header::MAJOR_VERSION_3);
    write_u16(out, header::BYTE_ORDER_MARK);
    write_u16(out, header::SECTOR_SHIFT_V3);
    write_u16(out, header::MINI_SECTOR_SHIFT);
    out.extend_from_slice(&[0u8; 6]);
    write_u32(out, 0);
    write_u32(out, layout.fat_cnt as u32);
    write_i32(out, (layout.difat_cnt + layout.fat_cnt + layout.mfat_cnt) as i32);
    write_u32(out, 0);
    write_u32(out, header::MINI_STREAM_CUTOFF);

    let first_minifat = if layout.mfat_cnt == 0 {
        SectorNumber::ENDOFCHAIN.0
    } else {
        (layout.difat_cnt + layout.fat_cnt) as i32
    };
    write_i32(out, first_minifat);
    write_u32(out, layout.mfat_cnt as u32);

    let first_difat = if layout.difat_cnt == 0 { SectorNumber::ENDOFCHAIN.0 } else { 0 };
    write_i32(out, first_difat);
    write_u32(out, layout.difat_cnt as u32);

    for i in 0..header::DIFAT_IN_HEADER_LEN {
        let v = fat_locations.get(i).copied().unwrap_or(SectorNumber::FREESECT.0);
        write_i32(out, v);
    }
}

fn build_fat_locations(fat_cnt: u64, difat_cnt: u64) -> Vec<i32> {
    (0..fat_cnt).map(|i| (difat_cnt + i) as i32).collect()
}

fn write_difat_overflow(out: &mut Vec<u8>, fat_locations: &[i32], difat_cnt: u64) {
    let overflow = &fat_locations[fat_locations.len().min(header::DIFAT_IN_HEADER_LEN)..];
    for sector in 0..difat_cnt {
        let base = sector as usize * 127;
        for slot in 0..127 {
            let v = overflow.get(base + slot).copied().unwrap_or(SectorNumber::FREESECT.0);
            write_i32(out, v);
        }
        let next = if sector + 1 < difat_cnt { (sector + 1) as i32 } else { SectorNumber::ENDOFCHAIN.0 };
        write_i32(out, next);
    }
}

fn build_fat_entries(entries: &[Entry], layout: &Layout) -> Vec<i32> {
    let mut v = Vec::new();
    v.extend(std::iter::repeat(SectorNumber::DIFSECT.0).take(layout.difat_cnt as usize));
    v.extend(std::iter::repeat(SectorNumber::FATSECT.0).take(layout.fat_cnt as usize));

    // Pointer values are absolute sector indices (see `chain_pointers`), so
    // each region's base must match the absolute sector number the writer's
    // payload-emission loop (and the layout planner's `fat_cursor`) assigned
    // it — the two must stay in lockstep.
    let mfat_base = (layout.difat_cnt + layout.fat_cnt) as i32;
    v.extend(chain_pointers(mfat_base, layout.mfat_cnt as usize));

    let dir_base = mfat_base + layout.mfat_cnt as i32;
    v.extend(chain_pointers(dir_base, layout.dir_cnt as usize));

    for entry in entries.iter().filter(|e| e.kind == Kind::Stream && e.size >= layout::MINI_CUTOFF) {
        let len = layout::ceil_div(entry.size, SECTOR_SIZE as u64) as usize;
        v.extend(chain_pointers(entry.start, len));
    }

    let mini_base = dir_base + layout.dir_cnt as i32 + layout.fat_size as i32;
    v.extend(chain_pointers(mini_base, layout.mini_cnt as usize));

    let total_slots = layout.fat_cnt as usize * (SECTOR_SIZE / 4);
    v.resize(v.len().max(total_slots), SectorNumber::ENDOFCHAIN.0);
    v.truncate(total_slots);
    v
}

fn build_minifat_entries(entries: &[Entry], layout: &Layout) -> Vec<i32> {
    let mut v = Vec::new();
    // `entry.start` is already the mini-sector-relative absolute index the
    // layout planner assigned (its own `mini_cursor` runs over the same
    // entries in the same order), so it doubles as this chain's base.
    for entry in entries.iter().filter(|e| e.kind == Kind::Stream && e.size > 0 && e.size < layout::MINI_CUTOFF) {
        let len = layout::ceil_div(entry.size, MINI_SECTOR_SIZE as u64) as usize;
        v.extend(chain_pointers(entry.start, len));
    }
    let total_slots = layout.mfat_cnt as usize * (SECTOR_SIZE / 4);
    v.resize(v.len().max(total_slots), SectorNumber::ENDOFCHAIN.0);
    v.truncate(total_slots);
    v
}

fn write_directory_entry(out: &mut Vec<u8>, entry: &Entry, is_root: bool) {
    out.extend(utf16le_padded(&entry.name, 64));
    let name_units = entry.name.encode_utf16().count();
    write_u16(out, ((name_units + 1) * 2) as u16);
    out.push(entry.kind as u8);
    out.push(entry.color as u8);
    write_i32(out, entry.left);
    write_i32(out, entry.right);
    write_i32(out, entry.child);
    out.extend_from_slice(&entry.clsid);
    write_u32(out, entry.state);
    zero_filetime(out);
    zero_filetime(out);
    let start = if is_root && entry.size > 0 { entry.start - 1 } else { entry.start };
    write_u32(out, start as u32);
    write_u32(out, entry.size as u32);
    write_u32(out, 0);
}

fn write_empty_directory_slot(out: &mut Vec<u8>) {
    out.extend(std::iter::repeat(0u8).take(64 + 2 + 1 + 1));
    write_i32(out, NOSTREAM);
    write_i32(out, NOSTREAM);
    write_i32(out, NOSTREAM);
    out.extend(std::iter::repeat(0u8).take(Entry::LENGTH - 80));
}

fn pad_to(out: &mut Vec<u8>, boundary: usize) {
    let rem = out.len() % boundary;
    if rem != 0 {
        out.resize(out.len() + (boundary - rem), 0);
    }
}
