/// Integer division with explicit rounding direction, for any combination of signs.
pub(crate) trait NumExt {
    /// Division rounding towards positive infinity.
    fn div_ceil(self, other: Self) -> Self;

    /// Division rounding towards negative infinity.
    fn div_floor(self, other: Self) -> Self;
}

impl NumExt for i32 {
    fn div_ceil(self, other: Self) -> Self {
        let quotient = self / other;
        let remainder = self % other;
        if remainder != 0 && ((remainder > 0) == (other > 0)) {
            quotient + 1
        } else {
            quotient
        }
    }

    fn div_floor(self, other: Self) -> Self {
        let quotient = self / other;
        let remainder = self % other;
        if remainder != 0 && ((remainder < 0) != (other < 0)) {
            quotient - 1
        } else {
            quotient
        }
    }
}
