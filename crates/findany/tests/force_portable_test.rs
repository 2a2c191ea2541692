// Detection honors FINDANY_FORCE_PORTABLE. Kept in its own test binary so the
// environment change cannot leak into other tests.
use findany::{ByteSearchValues, CharSearchValues, Isa, MatchMode, StringSearchValues, FORCE_PORTABLE_ENV};

#[test]
fn test_force_portable_env() {
    std::env::remove_var(FORCE_PORTABLE_ENV);
    let native = Isa::detect();

    // Only "1" forces the portable kernels.
    for other in ["0", "true", ""] {
        std::env::set_var(FORCE_PORTABLE_ENV, other);
        assert_eq!(Isa::detect(), native, "{:?}", other);
    }

    std::env::set_var(FORCE_PORTABLE_ENV, "1");
    assert_eq!(Isa::detect(), Isa::Portable);

    let text: Vec<u16> = "forced portable".encode_utf16().collect();
    let set = StringSearchValues::new(&["port", "able"], MatchMode::CaseSensitive).unwrap();
    assert_eq!(set.isa(), Isa::Portable);
    assert_eq!(set.index_of_any(&text), Some(7));
    assert_eq!(CharSearchValues::new(&[b'z' as u16]).isa(), Isa::Portable);
    assert_eq!(ByteSearchValues::new(b"xyz").isa(), Isa::Portable);

    std::env::remove_var(FORCE_PORTABLE_ENV);
    assert_eq!(Isa::detect(), native);
}
