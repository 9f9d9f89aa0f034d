use meshweld_common::ArrayIndex;

/// Index windows of the unsigned types an index buffer may be packed into.
#[test]
fn index_window() {
    assert_eq!(u8::window(), 256);
    assert_eq!(u16::window(), 65536);
    #[cfg(target_pointer_width = "64")]
    {
        assert_eq!(u32::window(), 1 << 32);
    }
    assert_eq!(usize::window(), usize::MAX);
}

#[test]
fn from_slot() {
    assert_eq!(u16::from_slot(65535), Some(u16::MAX));
    assert_eq!(u16::from_slot(65536), None);
    assert_eq!(u32::from_slot(65536), Some(65536));
}
