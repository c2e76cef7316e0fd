//! Little-endian serialization helpers for building container headers.

pub trait WriteBytesLe {
    fn write_le(&self, dst: &mut Vec<u8>);
}

macro_rules! impl_num_le {
    ($($t:ty),+) => { $(
        impl WriteBytesLe for $t { #[inline] fn write_le(&self, dst: &mut Vec<u8>) { dst.extend_from_slice(&self.to_le_bytes()); }}
    )+ }
}

impl_num_le!(u8, i8, u16, i16, u32, i32);

impl<const N: usize> WriteBytesLe for [u8; N] {
    #[inline]
    fn write_le(&self, dst: &mut Vec<u8>) {
        dst.extend_from_slice(self);
    }
}

impl WriteBytesLe for &[u8] {
    #[inline]
    fn write_le(&self, dst: &mut Vec<u8>) {
        dst.extend_from_slice(self);
    }
}

/// Concatenates the little-endian encodings of the given values.
#[macro_export]
macro_rules! join_bytes_le {
    ( $($value:expr),+ $(,)? ) => {{
        let mut vec = Vec::<u8>::new();
        $( $crate::utils::byteorder::WriteBytesLe::write_le(&$value, &mut vec); )+
        vec
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn join_mixed_widths() {
        let bytes = join_bytes_le!(*b"FLLR", 0x1234u16, 0xABCDEF01u32, -2i16);
        assert_eq!(
            bytes,
            [b'F', b'L', b'L', b'R', 0x34, 0x12, 0x01, 0xEF, 0xCD, 0xAB, 0xFE, 0xFF]
        );
    }
}
