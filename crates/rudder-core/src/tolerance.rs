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

//! Floating point comparisons with an absolute feasibility tolerance.

/// Default absolute tolerance for feasibility and integrality checks.
pub const DEFAULT_FEASTOL: f64 = 1e-6;

/// Distance of `x` to the closest integer below it, in `[0, 1)`.
#[inline]
pub fn frac(x: f64) -> f64 {
    x - x.floor()
}

/// Distance of `x` to the nearest integer, in `[0, 0.5]`.
#[inline]
pub fn fractionality(x: f64) -> f64 {
    let f = frac(x);
    f.min(1.0 - f)
}

/// Whether `x` is integral within `tol`.
#[inline]
pub fn is_integral(x: f64, tol: f64) -> bool {
    fractionality(x) <= tol
}

/// Whether `a <= b` within `tol`.
#[inline]
pub fn is_le(a: f64, b: f64, tol: f64) -> bool {
    a <= b + tol
}

/// Whether `a == b` within `tol`.
#[inline]
pub fn is_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}
