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

//! Traits for encoding and decoding SCION header structures to and from the wire.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::packet::InadequateBufferSize;

/// A type that can be encoded into a contiguous buffer.
pub trait WireEncode {
    /// The error returned when encoding fails.
    type Error: From<InadequateBufferSize>;

    /// The number of bytes written by [`Self::encode_to`].
    fn encoded_length(&self) -> usize;

    /// Encodes `self` into the buffer without checking its remaining capacity.
    ///
    /// Callers must ensure that at least [`Self::encoded_length`] bytes are available.
    fn encode_to_unchecked<T: BufMut>(&self, buffer: &mut T);

    /// Encodes `self` into the buffer, failing if the buffer is too small.
    fn encode_to<T: BufMut>(&self, buffer: &mut T) -> Result<(), Self::Error> {
        if buffer.remaining_mut() < self.encoded_length() {
            return Err(InadequateBufferSize.into());
        }
        self.encode_to_unchecked(buffer);
        Ok(())
    }

    /// Encodes `self` into a freshly allocated [`Bytes`].
    fn encode_to_bytes(&self) -> Bytes {
        let mut buffer = BytesMut::with_capacity(self.encoded_length());
        self.encode_to_unchecked(&mut buffer);
        buffer.freeze()
    }
}

/// A type that can be decoded from a buffer.
pub trait WireDecode<T: Buf>: Sized {
    /// The error returned when decoding fails.
    type Error;

    /// Decodes `Self` from the front of `data`, advancing it past the consumed bytes.
    fn decode(data: &mut T) -> Result<Self, Self::Error>;
}

/// Declares a newtype around an unsigned integer that only uses the lowest `$bits` bits.
macro_rules! bounded_uint {
    (
        $(#[$outer:meta])*
        pub struct $name:ident($type:ty : $bits:literal);
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub(crate) $type);

        impl $name {
            /// The number of bits used by the value.
            pub const BITS: u32 = $bits;
            /// The largest representable value.
            pub const MAX: Self = Self(((1 as $type) << $bits) - 1);

            /// Creates a new value, returning `None` if it does not fit into the available bits.
            pub const fn new(value: $type) -> Option<Self> {
                if value <= Self::MAX.0 {
                    Some(Self(value))
                } else {
                    None
                }
            }

            /// Creates a new value, discarding all bits that do not fit.
            pub const fn new_truncated(value: $type) -> Self {
                Self(value & Self::MAX.0)
            }

            /// Returns the value as the underlying integer type.
            pub const fn get(&self) -> $type {
                self.0
            }
        }
    };
}
pub(crate) use bounded_uint;

#[cfg(test)]
mod tests {
    bounded_uint! {
        pub struct Nibble(u8 : 4);
    }

    #[test]
    fn bounded_uint_limits() {
        assert_eq!(Nibble::MAX.get(), 0b1111);
        assert_eq!(Nibble::new(15), Some(Nibble(15)));
        assert_eq!(Nibble::new(16), None);
        assert_eq!(Nibble::new_truncated(0b1_0011).get(), 0b0011);
    }
}
