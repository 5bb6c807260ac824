/*++

Licensed under the Apache-2.0 license.

File Name:

    array.rs

Abstract:

    File contains the word arrays exchanged with the KHAZAD accelerator.
    Words are packed big-endian: byte 0 is the most significant byte of
    word 0.

--*/

use core::ops::BitXor;

macro_rules! array4 {
    ($dim: literal) => {
        paste::paste! {
            pub const [<ARRAY_4X $dim _BYTE_SIZE>]: usize = $dim * core::mem::size_of::<u32>();
            pub const [<ARRAY_4X $dim _WORD_SIZE>]: usize = $dim;

            #[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
            pub struct [<Array4x $dim>](pub [u32; [<ARRAY_4X $dim _WORD_SIZE>]]);

            impl From<[u8; [<ARRAY_4X $dim _BYTE_SIZE>]]> for [<Array4x $dim>] {
                #[inline(never)]
                fn from(value: [u8; [<ARRAY_4X $dim _BYTE_SIZE>]]) -> Self {
                    Self::from(&value)
                }
            }

            impl<'a> From<&'a [u8; [<ARRAY_4X $dim _BYTE_SIZE>]]> for [<Array4x $dim>] {
                #[inline(never)]
                fn from(value: &'a [u8; [<ARRAY_4X $dim _BYTE_SIZE>]]) -> Self {
                    let mut result = [<Array4x $dim>]([0u32; [<ARRAY_4X $dim _WORD_SIZE>]]);
                    for (word, chunk) in result.0.iter_mut().zip(value.chunks_exact(4)) {
                        *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                    }
                    result
                }
            }

            impl From<[<Array4x $dim>]> for [u8; [<ARRAY_4X $dim _BYTE_SIZE>]] {
                #[inline(never)]
                fn from(value: [<Array4x $dim>]) -> Self {
                    let mut result = [0u8; [<ARRAY_4X $dim _BYTE_SIZE>]];
                    for (chunk, word) in result.chunks_exact_mut(4).zip(value.0) {
                        chunk.copy_from_slice(&word.to_be_bytes());
                    }
                    result
                }
            }

            impl From<[u32; [<ARRAY_4X $dim _WORD_SIZE>]]> for [<Array4x $dim>] {
                #[inline(never)]
                fn from(value: [u32; [<ARRAY_4X $dim _WORD_SIZE>]]) -> Self {
                    [<Array4x $dim>](value)
                }
            }

            impl From<[<Array4x $dim>]> for [u32; [<ARRAY_4X $dim _WORD_SIZE>]] {
                #[inline(never)]
                fn from(value: [<Array4x $dim>]) -> Self {
                    value.0
                }
            }

            impl BitXor for [<Array4x $dim>] {
                type Output = Self;

                fn bitxor(mut self, rhs: Self) -> Self {
                    for (a, b) in self.0.iter_mut().zip(rhs.0) {
                        *a ^= b;
                    }
                    self
                }
            }

            impl [<Array4x $dim>] {
                pub const fn new(val: [u32; [<ARRAY_4X $dim _WORD_SIZE>]]) -> Self {
                    Self(val)
                }

                /// Big-endian byte view of the words.
                pub fn to_bytes(&self) -> [u8; [<ARRAY_4X $dim _BYTE_SIZE>]] {
                    (*self).into()
                }

                /// Build from a slice of exactly the array's byte size.
                pub fn from_slice(bytes: &[u8]) -> Option<Self> {
                    let bytes: &[u8; [<ARRAY_4X $dim _BYTE_SIZE>]] = bytes.try_into().ok()?;
                    Some(bytes.into())
                }
            }
        }
    };
}

array4!(2);
array4!(4);

/// One 64-bit cipher block
pub type Block = Array4x2;

/// One 128-bit cipher key
pub type CipherKey = Array4x4;

/// Block size in bytes
pub const BLOCK_SIZE: usize = ARRAY_4X2_BYTE_SIZE;
