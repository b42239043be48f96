use cfb_kit::cfb::header::Header;
use cfb_kit::cfb::Cfb;

const HEADER_LEN: usize = 512;
const DIFAT_IN_HEADER_LEN: usize = 109;
const SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

fn write_u16(buf: &mut [u8], offset: usize, v: u16) {
    buf[offset..offset + 2].copy_from_slice(&v.to_le_bytes());
}

fn write_i32(buf: &mut [u8], offset: usize, v: i32) {
    buf[offset..offset + 4].copy_from_slice(&v.to_le_bytes());
}

fn write_u32(buf: &mut [u8], offset: usize, v: u32) {
    buf[offset..offset + 4].copy_from_slice(&v.to_le_bytes());
}

/// Hand-assembles a minimal, otherwise-empty major-version-3 header so the
/// parser's field-by-field validation can be exercised without a fixture
/// file — the library never touches the filesystem.
fn minimal_v3_header() -> Vec<u8> {
    let mut bytes = vec![0u8; HEADER_LEN];
    bytes[0..8].copy_from_slice(&SIGNATURE);
    write_u16(&mut bytes, 24, 0x003E);
    write_u16(&mut bytes, 26, 0x0003);
    write_u16(&mut bytes, 28, 0xFFFE);
    write_u16(&mut bytes, 30, 0x0009);
    write_u16(&mut bytes, 32, 0x0006);
    write_u32(&mut bytes, 40, 0);
    write_u32(&mut bytes, 44, 0);
    write_i32(&mut bytes, 48, -2); // first directory sector: ENDOFCHAIN (empty)
    write_u32(&mut bytes, 56, 0x0000_1000);
    write_i32(&mut bytes, 60, -2);
    write_u32(&mut bytes, 64, 0);
    write_i32(&mut bytes, 68, -2);
    write_u32(&mut bytes, 72, 0);
    for i in 0..DIFAT_IN_HEADER_LEN {
        write_i32(&mut bytes, 76 + i * 4, -1);
    }
    bytes
}

#[test]
fn parses_every_fixed_field() {
    let header = Header::parse(&minimal_v3_header()).unwrap();
    assert_eq!(header.minor_version, 0x003E);
    assert_eq!(header.major_version, 0x0003);
    assert_eq!(header.sector_size, 512);
    assert_eq!(header.no_of_directory_sectors, 0);
    assert_eq!(header.no_of_fat_sectors, 0);
    assert_eq!(header.no_of_mini_fat_sectors, 0);
    assert_eq!(header.no_of_difat_sectors, 0);
    assert_eq!(header.difat.len(), DIFAT_IN_HEADER_LEN);
}

#[test]
fn rejects_bad_signature() {
    let mut bytes = minimal_v3_header();
    bytes[0] = 0x00;
    assert!(Header::parse(&bytes).is_err());
}

#[test]
fn rejects_wrong_sector_shift_for_major_version() {
    let mut bytes = minimal_v3_header();
    write_u16(&mut bytes, 30, 0x000C);
    assert!(Header::parse(&bytes).is_err());
}

#[test]
fn header_round_trips_through_a_written_image() {
    let mut cfb = Cfb::new();
    cfb.add("hello.txt", b"1234".to_vec());
    let bytes = cfb.write();
    let header = Header::parse(&bytes).unwrap();
    assert_eq!(header.major_version, 0x0003);
    assert_eq!(header.sector_size, 512);
}
