use transfer_pdf::{BuiltinFont, Error, FontCandidate, FontFace, FontResolver, FontRole, FontSet};

#[test]
fn missing_candidates_fall_back_to_builtin() {
    let _ = env_logger::try_init();
    let resolver = FontResolver::new(vec![
        FontCandidate::new("/nonexistent/font.ttf"),
        FontCandidate::with_bold("/nonexistent/a.ttf", "/nonexistent/a-bold.ttf"),
    ]);
    let set = resolver.resolve();
    assert!(!set.available());
    assert!(matches!(
        set.face(FontRole::Body),
        FontFace::Builtin(BuiltinFont::Helvetica)
    ));
    assert_eq!(set.bold_family(), "Helvetica-Bold");
}

#[test]
fn unparseable_font_files_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let junk = dir.path().join("junk.ttf");
    std::fs::write(&junk, b"definitely not a font").unwrap();
    let set = FontResolver::new(vec![FontCandidate::new(&junk)]).resolve();
    assert!(!set.available());
    assert_eq!(set.body_family(), "Helvetica");
}

#[test]
fn empty_candidate_list_is_fine() {
    let set = FontResolver::new(Vec::new()).resolve();
    assert!(!set.available());
}

#[test]
fn builtin_measurement() {
    let fonts = FontSet::builtin();
    // Helvetica: 'A' = 667, space = 278
    let w = fonts.measure("A A", FontRole::Body, 10.0).unwrap();
    assert!((w - (667.0 + 278.0 + 667.0) / 100.0).abs() < 1e-3);

    let regular = fonts.measure("Transfer", FontRole::Body, 12.0).unwrap();
    let bold = fonts.measure("Transfer", FontRole::Bold, 12.0).unwrap();
    assert!(bold > regular);

    assert_eq!(fonts.measure("", FontRole::Body, 12.0).unwrap(), 0.0);
}

#[test]
fn measurement_scales_with_size() {
    let fonts = FontSet::builtin();
    let small = fonts.measure("Quantity", FontRole::Body, 10.0).unwrap();
    let large = fonts.measure("Quantity", FontRole::Body, 20.0).unwrap();
    assert!((large - 2.0 * small).abs() < 1e-3);
}

#[test]
fn invalid_sizes_are_errors() {
    let fonts = FontSet::builtin();
    for size in [0.0, -4.0, f32::NAN, f32::INFINITY] {
        assert!(matches!(
            fonts.measure("x", FontRole::Body, size),
            Err(Error::Measurement(_))
        ));
    }
}
