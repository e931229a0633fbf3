// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use std::marker::PhantomData;

/// Proof that the controller, not the worker, is currently active.
///
/// Only [`ReverseControl::wait`](super::ReverseControl::wait) creates tokens
/// and [`ReverseControl::resume`](super::ReverseControl::resume) consumes
/// them, so a second resume without an intervening wait does not compile.
/// The token is neither `Clone` nor `Send`: it stays on the controller thread.
pub struct ControlToken {
    channel: u64,
    _not_send: PhantomData<*const ()>,
}

impl ControlToken {
    #[inline]
    pub(crate) fn new(channel: u64) -> Self {
        Self {
            channel,
            _not_send: PhantomData,
        }
    }

    /// Identifier of the channel that issued this token.
    #[inline]
    pub fn channel_id(&self) -> u64 {
        self.channel
    }
}

impl std::fmt::Debug for ControlToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ControlToken(channel {})", self.channel)
    }
}
