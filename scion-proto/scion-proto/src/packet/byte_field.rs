// Copyright 2025 Anapaya Systems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Big-endian bit field access.
//!
//! Bit offsets count from the most significant bit of a big-endian word, matching the header
//! diagrams in [`super::layout`]. Offsets and widths are protocol constants; a window that does
//! not fit into the word is a programming error and only checked in debug builds.

/// Reads the big-endian `u32` starting at `byte_offset`.
///
/// # Panics
///
/// Panics if the buffer is shorter than `byte_offset + 4`.
#[inline]
pub fn read_u32(buffer: &[u8], byte_offset: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&buffer[byte_offset..byte_offset + 4]);
    u32::from_be_bytes(word)
}

/// Reads the big-endian `u64` starting at `byte_offset`.
///
/// # Panics
///
/// Panics if the buffer is shorter than `byte_offset + 8`.
#[inline]
pub fn read_u64(buffer: &[u8], byte_offset: usize) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&buffer[byte_offset..byte_offset + 8]);
    u64::from_be_bytes(word)
}

/// Reads the big-endian `u16` starting at `byte_offset`.
///
/// # Panics
///
/// Panics if the buffer is shorter than `byte_offset + 2`.
#[inline]
pub fn read_u16(buffer: &[u8], byte_offset: usize) -> u16 {
    u16::from_be_bytes([buffer[byte_offset], buffer[byte_offset + 1]])
}

/// Writes `value` big-endian at `byte_offset`.
#[inline]
pub fn write_u32(buffer: &mut [u8], byte_offset: usize, value: u32) {
    buffer[byte_offset..byte_offset + 4].copy_from_slice(&value.to_be_bytes());
}

/// Writes `value` big-endian at `byte_offset`.
#[inline]
pub fn write_u64(buffer: &mut [u8], byte_offset: usize, value: u64) {
    buffer[byte_offset..byte_offset + 8].copy_from_slice(&value.to_be_bytes());
}

/// Writes `value` big-endian at `byte_offset`.
#[inline]
pub fn write_u16(buffer: &mut [u8], byte_offset: usize, value: u16) {
    buffer[byte_offset..byte_offset + 2].copy_from_slice(&value.to_be_bytes());
}

#[inline]
const fn mask32(bit_width: u32) -> u32 {
    if bit_width >= u32::BITS {
        u32::MAX
    } else {
        (1 << bit_width) - 1
    }
}

#[inline]
const fn mask64(bit_width: u32) -> u64 {
    if bit_width >= u64::BITS {
        u64::MAX
    } else {
        (1 << bit_width) - 1
    }
}

/// Extracts `bit_width` bits starting `bit_offset` bits from the MSB of `word`.
#[inline]
pub const fn read_bits(word: u32, bit_offset: u32, bit_width: u32) -> u32 {
    debug_assert!(bit_width > 0 && bit_offset + bit_width <= u32::BITS);
    (word >> (u32::BITS - bit_offset - bit_width)) & mask32(bit_width)
}

/// Returns `word` with the `bit_width` bits at `bit_offset` replaced by the low bits of `value`.
///
/// Bits of `value` that do not fit into the window are discarded.
#[inline]
pub const fn write_bits(word: u32, bit_offset: u32, bit_width: u32, value: u32) -> u32 {
    debug_assert!(bit_width > 0 && bit_offset + bit_width <= u32::BITS);
    let shift = u32::BITS - bit_offset - bit_width;
    let mask = mask32(bit_width) << shift;
    (word & !mask) | ((value << shift) & mask)
}

/// 64-bit variant of [`read_bits`].
#[inline]
pub const fn read_bits64(word: u64, bit_offset: u32, bit_width: u32) -> u64 {
    debug_assert!(bit_width > 0 && bit_offset + bit_width <= u64::BITS);
    (word >> (u64::BITS - bit_offset - bit_width)) & mask64(bit_width)
}

/// 64-bit variant of [`write_bits`].
#[inline]
pub const fn write_bits64(word: u64, bit_offset: u32, bit_width: u32, value: u64) -> u64 {
    debug_assert!(bit_width > 0 && bit_offset + bit_width <= u64::BITS);
    let shift = u64::BITS - bit_offset - bit_width;
    let mask = mask64(bit_width) << shift;
    (word & !mask) | ((value << shift) & mask)
}

/// Reads the single bit at `bit_offset` from the MSB of `word`.
#[inline]
pub const fn read_bool(word: u32, bit_offset: u32) -> bool {
    read_bits(word, bit_offset, 1) == 1
}
