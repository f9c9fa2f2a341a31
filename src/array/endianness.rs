use derive_more::Display;

/// The endianness of each element in an array, either `big` or `little`.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display)]
pub enum Endianness {
    /// Little endian.
    Little,

    /// Big endian.
    Big,
}

impl Endianness {
    /// Return true if the endianness matches the endianness of the CPU.
    #[must_use]
    pub fn is_native(self) -> bool {
        self == NATIVE_ENDIAN
    }
}

/// The endianness of the CPU.
pub const NATIVE_ENDIAN: Endianness = if cfg!(target_endian = "big") {
    Endianness::Big
} else {
    Endianness::Little
};

/// Reverse the byte order of each `element_size` byte element in `bytes`.
///
/// Single byte elements are left unchanged.
pub fn reverse_endianness(bytes: &mut [u8], element_size: usize) {
    if element_size > 1 {
        bytes
            .chunks_exact_mut(element_size)
            .for_each(<[u8]>::reverse);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endianness_reverse() {
        let mut bytes = vec![1, 2, 3, 4, 5, 6, 7, 8];
        reverse_endianness(&mut bytes, 1);
        assert_eq!(bytes, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        reverse_endianness(&mut bytes, 2);
        assert_eq!(bytes, vec![2, 1, 4, 3, 6, 5, 8, 7]);
        reverse_endianness(&mut bytes, 2);
        reverse_endianness(&mut bytes, 4);
        assert_eq!(bytes, vec![4, 3, 2, 1, 8, 7, 6, 5]);
    }

    #[test]
    fn endianness_native() {
        assert!(NATIVE_ENDIAN.is_native());
        assert_eq!(Endianness::Little.is_native(), cfg!(target_endian = "little"));
    }
}
