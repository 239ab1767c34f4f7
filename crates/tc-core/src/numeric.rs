/// Floating point type used throughout system
pub type Real = f64;

/// Index of the first NaN or infinite entry, if any.
pub fn first_non_finite<'a, I>(values: I) -> Option<usize>
where
    I: IntoIterator<Item = &'a Real>,
{
    values.into_iter().position(|v| !v.is_finite())
}

pub fn all_finite<'a, I>(values: I) -> bool
where
    I: IntoIterator<Item = &'a Real>,
{
    first_non_finite(values).is_none()
}
