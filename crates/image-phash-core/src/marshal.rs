//! Byte-order marshaling of hash values into binary buffers.
//!
//! The single-value hash buffer is written most significant byte first. Bytes
//! are extracted with shifts and masks instead of by reinterpreting the
//! integer's memory, so the output is the same on every host. On the
//! little-endian machines the hash service has always run on, this is
//! exactly the native in-memory layout mirrored byte for byte.

/// A fixed-width unsigned integer that can be written to and read from a
/// most-significant-byte-first buffer.
pub trait WireInt: Copy + Sized {
    /// Width of the integer in bytes
    const WIDTH: usize;

    /// Byte `index` counted from the most significant end
    fn byte_at(self, index: usize) -> u8;

    /// Rebuild the integer from exactly `WIDTH` bytes, most significant first
    fn from_wire(bytes: &[u8]) -> Self;
}

macro_rules! impl_wire_int {
    ($($t:ty),*) => {
        $(
            impl WireInt for $t {
                const WIDTH: usize = std::mem::size_of::<$t>();

                #[inline]
                fn byte_at(self, index: usize) -> u8 {
                    let shift = (Self::WIDTH - 1 - index) * 8;
                    ((self >> shift) & 0xff) as u8
                }

                #[inline]
                fn from_wire(bytes: &[u8]) -> Self {
                    bytes
                        .iter()
                        .take(Self::WIDTH)
                        .fold(0, |acc: $t, &byte| (acc << 8) | byte as $t)
                }
            }
        )*
    };
}

impl_wire_int!(u16, u32, u64, u128);

/// Write `value` into a new buffer, most significant byte first.
///
/// Output byte `i` holds bits `8 * (N - 1 - i)` through `8 * (N - i) - 1`.
pub fn reverse_bytes<T: WireInt>(value: T) -> Vec<u8> {
    (0..T::WIDTH).map(|i| value.byte_at(i)).collect()
}

/// Inverse of [`reverse_bytes`]. Returns `None` unless `bytes` is exactly
/// `T::WIDTH` long.
pub fn restore_bytes<T: WireInt>(bytes: &[u8]) -> Option<T> {
    if bytes.len() != T::WIDTH {
        return None;
    }
    Some(T::from_wire(bytes))
}

/// Produce a buffer holding exactly `length` bytes of `array`, in order.
///
/// The vector is moved, not copied; any tail beyond `length` is dropped.
pub fn wrap_bytes(mut array: Vec<u8>, length: usize) -> Vec<u8> {
    debug_assert!(array.len() >= length, "hash array shorter than its length");
    array.truncate(length);
    array
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_bytes_is_most_significant_first() {
        let buffer = reverse_bytes(0x0102_0304_0506_0708u64);
        assert_eq!(buffer, vec![1, 2, 3, 4, 5, 6, 7, 8]);

        assert_eq!(reverse_bytes(0xabcdu16), vec![0xab, 0xcd]);
        assert_eq!(reverse_bytes(0u32), vec![0, 0, 0, 0]);
        assert_eq!(reverse_bytes(u128::MAX).len(), 16);
    }

    #[test]
    #[cfg(target_endian = "little")]
    fn test_reverse_bytes_mirrors_native_layout() {
        let value = 2_816_561_582_497_829_945u64;
        let mut native = value.to_ne_bytes().to_vec();
        native.reverse();
        assert_eq!(reverse_bytes(value), native);
    }

    #[test]
    fn test_restore_bytes_inverts_reverse_bytes() {
        for value in [0u64, 1, 0xff, 0x8000_0000_0000_0000, u64::MAX, 15_433_968_795_834_791_622] {
            assert_eq!(restore_bytes::<u64>(&reverse_bytes(value)), Some(value));
        }
        for value in [0u32, 0xdead_beef, u32::MAX] {
            assert_eq!(restore_bytes::<u32>(&reverse_bytes(value)), Some(value));
        }
    }

    #[test]
    fn test_restore_bytes_rejects_wrong_width() {
        assert_eq!(restore_bytes::<u64>(&[1, 2, 3]), None);
        assert_eq!(restore_bytes::<u16>(&[1, 2, 3]), None);
    }

    #[test]
    fn test_wrap_bytes_keeps_order_and_length() {
        let array = vec![9, 8, 7, 6, 5];
        assert_eq!(wrap_bytes(array.clone(), 5), array);
        assert_eq!(wrap_bytes(array, 3), vec![9, 8, 7]);
        assert!(wrap_bytes(Vec::new(), 0).is_empty());
    }
}
