use std::fmt::Debug;

use num_traits::{Bounded, Num, NumCast, ToPrimitive};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A trait for types that can be used for indexed coordinates.
///
/// This trait is sealed and cannot be implemented for external types. Every coordinate type needs
/// a matching accumulation type and a pair of "no points yet" sentinels, and both are chosen here
/// for a closed set of primitives.
pub trait IndexableNum:
    private::Sealed
    + Num
    + NumCast
    + ToPrimitive
    + PartialOrd
    + Bounded
    + Copy
    + Default
    + Debug
    + Send
    + Sync
    + Serialize
    + DeserializeOwned
    + 'static
{
    /// Type used to accumulate squared or absolute coordinate differences without overflow.
    type Acc: Accumulator;

    /// The name written into persisted trees, used to reject data of another coordinate type.
    const TYPE_NAME: &'static str;

    /// Widen to the accumulation type.
    fn to_acc(self) -> Self::Acc;

    /// Widen to `f64`.
    fn as_f64(self) -> f64;

    /// Initial value for the minimum of a bounding box that has seen no points yet.
    ///
    /// For floating point types this is `sqrt(MAX)` so that bounds can be squared by the distance
    /// tests without overflowing.
    fn upper_sentinel() -> Self;

    /// Initial value for the maximum of a bounding box that has seen no points yet.
    ///
    /// For signed integers this is `-MAX` rather than `MIN`, which cannot be negated.
    fn lower_sentinel() -> Self;
}

/// A numeric type distances are computed in.
pub trait Accumulator:
    Num + NumCast + Bounded + PartialOrd + Copy + Debug + Send + Sync + 'static
{
}

impl<T> Accumulator for T where
    T: Num + NumCast + Bounded + PartialOrd + Copy + Debug + Send + Sync + 'static
{
}

macro_rules! impl_indexable_int {
    ($t:ty, $acc:ty, $lower:expr) => {
        impl IndexableNum for $t {
            type Acc = $acc;
            const TYPE_NAME: &'static str = stringify!($t);

            #[inline]
            fn to_acc(self) -> $acc {
                self as $acc
            }

            #[inline]
            fn as_f64(self) -> f64 {
                self as f64
            }

            fn upper_sentinel() -> Self {
                <$t>::MAX
            }

            fn lower_sentinel() -> Self {
                $lower
            }
        }
    };
}

macro_rules! impl_indexable_float {
    ($t:ty) => {
        impl IndexableNum for $t {
            type Acc = f64;
            const TYPE_NAME: &'static str = stringify!($t);

            #[inline]
            fn to_acc(self) -> f64 {
                self as f64
            }

            #[inline]
            fn as_f64(self) -> f64 {
                self as f64
            }

            fn upper_sentinel() -> Self {
                <$t>::MAX.sqrt()
            }

            fn lower_sentinel() -> Self {
                -<$t>::MAX.sqrt()
            }
        }
    };
}

impl_indexable_int!(i8, i64, -i8::MAX);
impl_indexable_int!(u8, i64, 0);
impl_indexable_int!(i16, i64, -i16::MAX);
impl_indexable_int!(u16, i64, 0);
impl_indexable_int!(i32, i128, -i32::MAX);
impl_indexable_int!(u32, i128, 0);
impl_indexable_float!(f32);
impl_indexable_float!(f64);

// https://rust-lang.github.io/api-guidelines/future-proofing.html#sealed-traits-protect-against-downstream-implementations-c-sealed
mod private {
    pub trait Sealed {}

    impl Sealed for i8 {}
    impl Sealed for u8 {}
    impl Sealed for i16 {}
    impl Sealed for u16 {}
    impl Sealed for i32 {}
    impl Sealed for u32 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}
