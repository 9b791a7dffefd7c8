// Copyright Rouven Bauer
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// heavily inspired by [serde_json]'s `json!` macro
// [serde_json]: https://github.com/serde-rs/json

#[cfg(doc)]
use crate::value::ValueSend;

macro_rules! hash_map {
    () => {::std::collections::HashMap::new()};
    ( $($key:expr => $value:expr),+ $(,)? ) => {{
        #[allow(unused_mut)]
        let mut m = ::std::collections::HashMap::new();
        $( m.insert($key, $value); )+
        m
    }};
}

pub(crate) use hash_map;

/// Short notation for creating a [`ValueSend`].
///
/// # Examples
///
/// Special values:
/// ```
/// use neo4j::{value, ValueSend};
///
/// assert_eq!(ValueSend::Null, value!(null));
/// assert_eq!(ValueSend::Boolean(true), value!(true));
/// assert_eq!(ValueSend::Boolean(false), value!(false));
/// ```
///
/// Any value that implements `Into<ValueSend>`:
/// ```
/// use neo4j::{value, ValueSend};
///
/// assert_eq!(ValueSend::Integer(1), value!(1));
/// assert_eq!(ValueSend::Float(1.234), value!(1.234));
/// assert_eq!(ValueSend::String(String::from("foo")), value!("foo"));
/// ```
///
/// Create a [`ValueSend::Bytes`]:
/// ```
/// use neo4j::{value, ValueSend};
///
/// assert_eq!(ValueSend::Bytes(vec![1, 2, 3]), value!(bytes(1, 2, 3)));
/// ```
///
/// Create a [`ValueSend::List`]:
/// ```
/// use neo4j::{value, ValueSend};
///
/// assert_eq!(
///     ValueSend::List(vec![ValueSend::Integer(1), ValueSend::Float(2.), ValueSend::Null]),
///     value!([1, 2., null])
/// );
/// ```
///
/// Create a [`ValueSend::Map`]; see also [`value_map!`]:
/// ```
/// use neo4j::{value, value_map};
///
/// assert_eq!(value!({"foo": 1, "bar": null}), value!({"foo": 1, "bar": null}));
/// ```
#[macro_export(local_inner_macros)]
macro_rules! value {
    ($($value:tt)+) => {
        __value_internal!($($value)+)
    };
}

/// Short notation for creating a `HashMap<String, ValueSend>`, e.g. query parameters.
///
/// # Examples
/// ```
/// use neo4j::value_map;
///
/// let params = value_map!({"name": "Alice", "age": 42});
/// assert_eq!(params.len(), 2);
/// ```
#[macro_export(local_inner_macros)]
macro_rules! value_map {
    ({$(,)?}) => {
        ::std::collections::HashMap::new()
    };
    ({ $($tt:tt)+ }) => {{
        let mut map = ::std::collections::HashMap::new();
        __value_internal!(@map map () ($($tt)+) ($($tt)+));
        map
    }};
}

#[macro_export]
#[doc(hidden)]
macro_rules! __value_internal {
    //////////////////////////////////////////////////////////////////////////
    // TT muncher for parsing the inside of a list [...].
    // Produces a Vec<ValueSend> of the elements.
    //
    // Must be invoked as: __value_internal!(@list [] $($tt)*)
    //////////////////////////////////////////////////////////////////////////

    (@list [$($elems:expr,)*]) => {
        vec![$($elems,)*]
    };

    (@list [$($elems:expr),*]) => {
        vec![$($elems),*]
    };

    (@list [$($elems:expr,)*] null $($rest:tt)*) => {
        $crate::__value_internal!(@list [$($elems,)* $crate::__value_internal!(null)] $($rest)*)
    };

    (@list [$($elems:expr,)*] [$($array:tt)*] $($rest:tt)*) => {
        $crate::__value_internal!(@list [$($elems,)* $crate::__value_internal!([$($array)*])] $($rest)*)
    };

    (@list [$($elems:expr,)*] {$($map:tt)*} $($rest:tt)*) => {
        $crate::__value_internal!(@list [$($elems,)* $crate::__value_internal!({$($map)*})] $($rest)*)
    };

    (@list [$($elems:expr,)*] bytes($($bytes:tt)*) $($rest:tt)*) => {
        $crate::__value_internal!(@list [$($elems,)* $crate::__value_internal!(bytes($($bytes)*))] $($rest)*)
    };

    (@list [$($elems:expr,)*] $next:expr, $($rest:tt)*) => {
        $crate::__value_internal!(@list [$($elems,)* $crate::__value_internal!($next),] $($rest)*)
    };

    (@list [$($elems:expr,)*] $last:expr) => {
        $crate::__value_internal!(@list [$($elems,)* $crate::__value_internal!($last)])
    };

    (@list [$($elems:expr),*] , $($rest:tt)*) => {
        $crate::__value_internal!(@list [$($elems,)*] $($rest)*)
    };

    (@list [$($elems:expr),*] $unexpected:tt $($rest:tt)*) => {
        $crate::__value_unexpected!($unexpected)
    };

    //////////////////////////////////////////////////////////////////////////
    // TT muncher for parsing the inside of a map {...}. Each entry is
    // inserted into the given map variable, converting the value into a
    // `ValueSend` and the key into a `String`.
    //
    // Must be invoked as: __value_internal!(@map $map () ($($tt)*) ($($tt)*))
    //////////////////////////////////////////////////////////////////////////

    (@map $map:ident () () ()) => {};

    (@map $map:ident [$($key:tt)+] ($value:expr) , $($rest:tt)*) => {
        let _ = $map.insert(($($key)+).into(), $value);
        $crate::__value_internal!(@map $map () ($($rest)*) ($($rest)*));
    };

    (@map $map:ident [$($key:tt)+] ($value:expr) $unexpected:tt $($rest:tt)*) => {
        $crate::__value_unexpected!($unexpected);
    };

    (@map $map:ident [$($key:tt)+] ($value:expr)) => {
        let _ = $map.insert(($($key)+).into(), $value);
    };

    (@map $map:ident ($($key:tt)+) (: null $($rest:tt)*) $copy:tt) => {
        $crate::__value_internal!(@map $map [$($key)+] ($crate::value::ValueSend::Null) $($rest)*);
    };

    (@map $map:ident ($($key:tt)+) (: [$($array:tt)*] $($rest:tt)*) $copy:tt) => {
        $crate::__value_internal!(@map $map [$($key)+] ($crate::__value_internal!([$($array)*])) $($rest)*);
    };

    (@map $map:ident ($($key:tt)+) (: {$($mapp:tt)*} $($rest:tt)*) $copy:tt) => {
        $crate::__value_internal!(@map $map [$($key)+] ($crate::__value_internal!({$($mapp)*})) $($rest)*);
    };

    (@map $map:ident ($($key:tt)+) (: bytes( $($bytes:tt)* ) $($rest:tt)*) $copy:tt) => {
        $crate::__value_internal!(@map $map [$($key)+] ($crate::__value_internal!(bytes($($bytes)*))) $($rest)*);
    };

    (@map $map:ident ($($key:tt)+) (: $value:expr , $($rest:tt)*) $copy:tt) => {
        $crate::__value_internal!(@map $map [$($key)+] ($crate::__value_internal!($value)) , $($rest)*);
    };

    (@map $map:ident ($($key:tt)+) (: $value:expr) $copy:tt) => {
        $crate::__value_internal!(@map $map [$($key)+] ($crate::__value_internal!($value)));
    };

    (@map $map:ident ($($key:tt)+) (:) $copy:tt) => {
        $crate::__value_internal!();
    };

    (@map $map:ident ($($key:tt)+) () $copy:tt) => {
        $crate::__value_internal!();
    };

    (@map $map:ident () (: $($rest:tt)*) ($colon:tt $($copy:tt)*)) => {
        $crate::__value_unexpected!($colon);
    };

    (@map $map:ident ($($key:tt)*) (, $($rest:tt)*) ($comma:tt $($copy:tt)*)) => {
        $crate::__value_unexpected!($comma);
    };

    (@map $map:ident () (($key:expr) : $($rest:tt)*) $copy:tt) => {
        $crate::__value_internal!(@map $map ($key) (: $($rest)*) (: $($rest)*));
    };

    (@map $map:ident ($($key:tt)*) (: $($unexpected:tt)+) $copy:tt) => {
        $crate::value_expect_expr_comma!($($unexpected)+);
    };

    (@map $map:ident ($($key:tt)*) ($tt:tt $($rest:tt)*) $copy:tt) => {
        $crate::__value_internal!(@map $map ($($key)* $tt) ($($rest)*) ($($rest)*));
    };

    //////////////////////////////////////////////////////////////////////////
    // The main implementation.
    //
    // Must be invoked as: __value_internal!($($value)+)
    //////////////////////////////////////////////////////////////////////////

    (null) => {
        $crate::value::ValueSend::Null
    };

    ([]) => {
        $crate::value::ValueSend::List(vec![])
    };

    ([ $($tt:tt)+ ]) => {
        $crate::value::ValueSend::List($crate::__value_internal!(@list [] $($tt)+))
    };

    ({$(,)?}) => {
        $crate::value::ValueSend::Map(::std::collections::HashMap::new())
    };

    ({ $($tt:tt)+ }) => {
        $crate::value::ValueSend::Map({
            let mut map = ::std::collections::HashMap::new();
            $crate::__value_internal!(@map map () ($($tt)+) ($($tt)+));
            map
        })
    };

    (bytes()) => {
        $crate::value::ValueSend::Bytes(vec![])
    };

    (bytes( $($tt:tt),+ $(,)?)) => {
        $crate::value::ValueSend::Bytes(vec![$($tt),+])
    };

    // Any type implementing `Into<ValueSend>`: numbers, strings, spatial/temporal types, etc.
    // Must be below every other rule.
    ($other:expr) => {
        $other.into()
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! __value_unexpected {
    () => {};
}

#[macro_export]
#[doc(hidden)]
macro_rules! value_expect_expr_comma {
    ($e:expr $(,)?) => {};
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::value::spatial::*;
    use crate::ValueSend;

    #[test]
    fn test_null() {
        assert_eq!(value!(null), ValueSend::Null)
    }

    #[rstest]
    #[case(value!(true), ValueSend::Boolean(true))]
    #[case(value!(false), ValueSend::Boolean(false))]
    fn test_boolean(#[case] input: ValueSend, #[case] output: ValueSend) {
        assert_eq!(input, output);
    }

    #[rstest]
    #[case(value!(1), ValueSend::Integer(1))]
    #[case(value!(-1), ValueSend::Integer(-1))]
    #[case(value!(1u8), ValueSend::Integer(1))]
    #[case(value!(1i32), ValueSend::Integer(1))]
    #[case(value!(-1i32), ValueSend::Integer(-1))]
    #[case(value!(i64::MAX), ValueSend::Integer(i64::MAX))]
    fn test_int(#[case] input: ValueSend, #[case] output: ValueSend) {
        assert_eq!(input, output);
    }

    #[rstest]
    #[case(value!(1.0f32), ValueSend::Float(1.))]
    #[case(value!(1.0f64), ValueSend::Float(1.))]
    fn test_float(#[case] input: ValueSend, #[case] output: ValueSend) {
        assert_eq!(input, output);
    }

    #[rstest]
    #[case(value!(bytes()), ValueSend::Bytes(vec![]))]
    #[case(value!(bytes(1, 2, 3)), ValueSend::Bytes(vec![1, 2, 3]))]
    fn test_bytes(#[case] input: ValueSend, #[case] output: ValueSend) {
        assert_eq!(input, output);
    }

    #[rstest]
    #[case(value!([]), ValueSend::List(vec![]))]
    #[case(value!([null, 1]), ValueSend::List(vec![ValueSend::Null, ValueSend::Integer(1)]))]
    #[case(
        value!([1, [2], 3]),
        ValueSend::List(vec![
            ValueSend::Integer(1),
            ValueSend::List(vec![ValueSend::Integer(2)]),
            ValueSend::Integer(3),
        ])
    )]
    fn test_list(#[case] input: ValueSend, #[case] output: ValueSend) {
        assert_eq!(input, output);
    }

    #[rstest]
    #[case(value!({}), ValueSend::Map(value_map!({})))]
    #[case(value!({"a": 1}), ValueSend::Map(value_map!({"a": 1})))]
    #[case(value!({"a": 1, "b": 1.}), ValueSend::Map(value_map!({"a": 1, "b": 1.})))]
    fn test_map(#[case] input: ValueSend, #[case] output: ValueSend) {
        assert_eq!(input, output);
    }

    #[rstest]
    #[case(value!(Cartesian2D::new(1., 2.)), ValueSend::Cartesian2D(Cartesian2D::new(1., 2.)))]
    #[case(value!(Cartesian3D::new(1., 2., 3.)), ValueSend::Cartesian3D(Cartesian3D::new(1., 2., 3.)))]
    fn test_structs(#[case] input: ValueSend, #[case] output: ValueSend) {
        assert_eq!(input, output);
    }
}
