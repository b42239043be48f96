use cfb_kit::cfb::{Cfb, CfbError};

#[test]
fn small_stream_round_trips_name_and_content() {
    let mut cfb = Cfb::new();
    cfb.add("hello.txt", b"1234".to_vec());
    let bytes = cfb.write();

    let parsed = Cfb::parse(&bytes).expect("a freshly written image must parse");
    let entry = parsed
        .file_index()
        .iter()
        .zip(parsed.full_paths())
        .find(|(_, path)| path.as_str() == "/hello.txt")
        .expect("hello.txt survives the round trip");
    assert_eq!(entry.0.content.as_deref(), Some(&b"1234"[..]));
}

#[test]
fn large_stream_round_trips_through_the_fat_region() {
    let mut cfb = Cfb::new();
    let content = vec![b'!'; 7491];
    cfb.add("goodbye.txt", content.clone());
    let bytes = cfb.write();

    let parsed = Cfb::parse(&bytes).expect("a freshly written image must parse");
    let entry = parsed
        .file_index()
        .iter()
        .zip(parsed.full_paths())
        .find(|(_, path)| path.as_str() == "/goodbye.txt")
        .expect("goodbye.txt survives the round trip");
    assert_eq!(entry.0.content.as_deref(), Some(content.as_slice()));
}

#[test]
fn multiple_streams_round_trip_by_name_and_content() {
    let mut cfb = Cfb::new();
    cfb.add("a.txt", b"aaa".to_vec());
    cfb.add("b.txt", vec![b'b'; 9000]);
    cfb.add("c.txt", b"".to_vec());
    let bytes = cfb.write();

    let parsed = Cfb::parse(&bytes).unwrap();
    for (name, expected) in [("a.txt", &b"aaa"[..]), ("c.txt", &b""[..])] {
        let path = format!("/{}", name);
        let entry = parsed
            .file_index()
            .iter()
            .zip(parsed.full_paths())
            .find(|(_, p)| p.as_str() == path)
            .unwrap();
        assert_eq!(entry.0.content.as_deref(), Some(expected));
    }
    let big = parsed
        .file_index()
        .iter()
        .zip(parsed.full_paths())
        .find(|(_, p)| p.as_str() == "/b.txt")
        .unwrap();
    assert_eq!(big.0.content.as_deref(), Some(vec![b'b'; 9000].as_slice()));
}

#[test]
fn write_total_length_matches_sector_formula() {
    let mut cfb = Cfb::new();
    cfb.add("hello.txt", b"1234".to_vec());
    let bytes = cfb.write();
    assert_eq!(bytes.len() % 512, 0);
    assert!(bytes.len() >= 512);
}

#[test]
fn seed_entry_is_present_at_index_one() {
    let mut cfb = Cfb::new();
    cfb.add("hello.txt", b"1234".to_vec());
    cfb.write();
    assert_eq!(cfb.file_index()[1].name, "\u{1}Sh33tJ5");
}

#[test]
fn parse_rejects_empty_input() {
    let err = Cfb::parse(&[]).unwrap_err();
    assert!(matches!(err, CfbError::TooSmall { actual: 0 }));
}

#[test]
fn parse_rejects_zip_magic() {
    let mut input = vec![0x50, 0x4b, 0x03, 0x04];
    input.resize(512, 0);
    let err = Cfb::parse(&input).unwrap_err();
    assert!(matches!(err, CfbError::UnsupportedFormat { .. }));
}

#[test]
fn many_small_streams_round_trip_through_a_multi_sector_directory() {
    // 20 streams (plus root and the seed) push `dir_cnt` past a single
    // directory sector and the mini-stream region past a single FAT sector,
    // exercising chains that span more than one sector end to end.
    let mut cfb = Cfb::new();
    for i in 0..20 {
        cfb.add(&format!("s{:02}.txt", i), vec![b'x' + (i % 5) as u8; 100]);
    }
    let bytes = cfb.write();

    let parsed = Cfb::parse(&bytes).expect("a freshly written multi-sector image must parse");
    for i in 0..20 {
        let name = format!("s{:02}.txt", i);
        let path = format!("/{}", name);
        let entry = parsed
            .file_index()
            .iter()
            .zip(parsed.full_paths())
            .find(|(_, p)| p.as_str() == path)
            .unwrap_or_else(|| panic!("{} survives the round trip", name));
        assert_eq!(entry.0.content.as_deref(), Some(vec![b'x' + (i % 5) as u8; 100].as_slice()));
    }
}

#[test]
fn rebuild_is_idempotent_across_repeated_writes() {
    let mut cfb = Cfb::new();
    cfb.add("hello.txt", b"1234".to_vec());
    let first = cfb.write();
    let second = cfb.write();
    let third = cfb.write();
    assert_eq!(first, second);
    assert_eq!(second, third);
}
