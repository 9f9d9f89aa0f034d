/// Implement a binary operator and its `*Assign` sibling for a type, accepting the right-hand
/// side both by value and by reference.
///
/// `$act` computes the result of `$lhs op $rhs` from a borrowed `$lhs`; the assigning form is
/// derived from it.
#[macro_export]
macro_rules! impl_binop {
    ($Op:ident::$op:ident, $Assign:ident::$assign:ident;
     $lhs:ident: $Lhs:ty, $rhs:ident: $Rhs:ty => $act:expr) => {
        impl $Op<$Rhs> for $Lhs {
            type Output = $Lhs;
            #[inline]
            fn $op(self, $rhs: $Rhs) -> Self::Output {
                let $lhs = &self;
                $act
            }
        }
        impl $Op<&$Rhs> for $Lhs {
            type Output = $Lhs;
            #[inline]
            fn $op(self, $rhs: &$Rhs) -> Self::Output {
                let $rhs = *$rhs;
                let $lhs = &self;
                $act
            }
        }
        impl $Assign<$Rhs> for $Lhs {
            #[inline]
            fn $assign(&mut self, $rhs: $Rhs) {
                let $lhs = &*self;
                *self = $act;
            }
        }
        impl $Assign<&$Rhs> for $Lhs {
            #[inline]
            fn $assign(&mut self, $rhs: &$Rhs) {
                let $rhs = *$rhs;
                let $lhs = &*self;
                *self = $act;
            }
        }
    };
}

/// Implement `Add`/`AddAssign` and `Sub`/`SubAssign` with [impl_binop].
#[macro_export]
macro_rules! impl_add_sub {
    ($lhs:ident: $Lhs:ty, $rhs:ident: $Rhs:ty; $add:expr; $sub:expr) => {
        $crate::impl_binop! {Add::add, AddAssign::add_assign; $lhs: $Lhs, $rhs: $Rhs => $add}
        $crate::impl_binop! {Sub::sub, SubAssign::sub_assign; $lhs: $Lhs, $rhs: $Rhs => $sub}
    };
}

/// Implement `Mul`/`MulAssign` and `Div`/`DivAssign` with [impl_binop].
#[macro_export]
macro_rules! impl_mul_div {
    ($lhs:ident: $Lhs:ty, $rhs:ident: $Rhs:ty; $mul:expr; $div:expr) => {
        $crate::impl_binop! {Mul::mul, MulAssign::mul_assign; $lhs: $Lhs, $rhs: $Rhs => $mul}
        $crate::impl_binop! {Div::div, DivAssign::div_assign; $lhs: $Lhs, $rhs: $Rhs => $div}
    };
}
