//! Integer arithmetic fixtures shared with the other runtimes.
//!
//! Every runtime under test registers the same names with the same
//! semantics, so a test runner can compare results across runtimes. Integer
//! overflow is reported as a call failure rather than wrapping.

use serde_json::{Value, json};

use crate::registry::{Arguments, CallError, Manifest, MethodMetadata, MethodResult};
use crate::session::Session;
use crate::value::to_structured;

use super::MethodModule;

const COUNTER_KEY: &str = "counter";

/// The `simple_math` fixture module.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleMath;

impl MethodModule for SimpleMath {
    fn name(&self) -> &'static str {
        "simple_math"
    }

    fn manifest(&self) -> Manifest {
        Manifest::new()
            .stateless("add", binary("Add two numbers"), add)
            .stateless("multiply", binary("Multiply two numbers"), multiply)
            .stateless(
                "divide",
                binary("Integer division truncating toward zero"),
                divide,
            )
            .stateless(
                "fibonacci",
                unary("Calculate the nth Fibonacci number", "int"),
                fibonacci,
            )
            .stateless(
                "factorial",
                unary("Calculate factorial of a number", "int"),
                factorial,
            )
            .stateless(
                "is_prime",
                unary("Check if a number is prime", "bool"),
                is_prime,
            )
            .stateful(
                "counter_increment",
                counter("Increment a counter (stateful)"),
                counter_increment,
            )
            .stateful(
                "counter_get",
                counter("Get current counter value (stateful)"),
                counter_get,
            )
            .stateful(
                "counter_reset",
                counter("Reset the counter to zero (stateful)"),
                counter_reset,
            )
    }
}

fn binary(description: &str) -> MethodMetadata {
    MethodMetadata::described(description)
        .params(&["int", "int"])
        .returns("int")
}

fn unary(description: &str, returns: &str) -> MethodMetadata {
    MethodMetadata::described(description)
        .params(&["int"])
        .returns(returns)
}

fn counter(description: &str) -> MethodMetadata {
    MethodMetadata::described(description).returns("int")
}

fn overflow() -> CallError {
    CallError::new("integer overflow")
}

fn add(args: &Arguments) -> MethodResult {
    let a = args.require_i64("a")?;
    let b = args.require_i64("b")?;
    a.checked_add(b).map(Value::from).ok_or_else(overflow)
}

fn multiply(args: &Arguments) -> MethodResult {
    let a = args.require_i64("a")?;
    let b = args.require_i64("b")?;
    a.checked_mul(b).map(Value::from).ok_or_else(overflow)
}

fn divide(args: &Arguments) -> MethodResult {
    let a = args.require_i64("a")?;
    let b = args.require_i64("b")?;
    if b == 0 {
        return Err(CallError::new("division by zero"));
    }
    a.checked_div(b).map(Value::from).ok_or_else(overflow)
}

fn fibonacci(args: &Arguments) -> MethodResult {
    let n = args.require_i64("n")?;
    if n <= 1 {
        return Ok(to_structured(&n));
    }
    let (mut previous, mut current) = (0_i64, 1_i64);
    for _ in 2..=n {
        let next = previous.checked_add(current).ok_or_else(overflow)?;
        previous = current;
        current = next;
    }
    Ok(to_structured(&current))
}

fn factorial(args: &Arguments) -> MethodResult {
    let n = args.require_i64("n")?;
    let mut product = 1_i64;
    for factor in 2..=n {
        product = product.checked_mul(factor).ok_or_else(overflow)?;
    }
    Ok(to_structured(&product))
}

fn is_prime(args: &Arguments) -> MethodResult {
    let n = args.require_i64("n")?;
    Ok(to_structured(&prime(n)))
}

fn prime(n: i64) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if divides(n, 2) {
        return false;
    }
    let mut divisor = 3_i64;
    while divisor
        .checked_mul(divisor)
        .is_some_and(|square| square <= n)
    {
        if divides(n, divisor) {
            return false;
        }
        divisor += 2;
    }
    true
}

fn divides(n: i64, divisor: i64) -> bool {
    n.checked_rem(divisor) == Some(0)
}

fn counter_value(state: Option<&Value>) -> i64 {
    state.and_then(Value::as_i64).unwrap_or(0)
}

fn counter_increment(session: &Session, _args: &Arguments) -> MethodResult {
    session.update(|state| {
        let next = counter_value(state.get(COUNTER_KEY))
            .checked_add(1)
            .ok_or_else(overflow)?;
        state.insert(COUNTER_KEY.to_owned(), json!(next));
        Ok(json!(next))
    })
}

fn counter_get(session: &Session, _args: &Arguments) -> MethodResult {
    Ok(to_structured(&counter_value(
        session.get(COUNTER_KEY).as_ref(),
    )))
}

fn counter_reset(session: &Session, _args: &Arguments) -> MethodResult {
    session.set(COUNTER_KEY, json!(0));
    Ok(json!(0))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::value::decode_arguments;

    fn args(text: &str) -> Arguments {
        decode_arguments(Some(text)).expect("fixture arguments")
    }

    #[rstest]
    #[case::add(add as fn(&Arguments) -> MethodResult, r#"{"a": 2, "b": 3}"#, json!(5))]
    #[case::add_negative(add, r#"{"a": -7, "b": 3}"#, json!(-4))]
    #[case::multiply(multiply, r#"{"a": 6, "b": 7}"#, json!(42))]
    #[case::divide(divide, r#"{"a": 7, "b": 2}"#, json!(3))]
    #[case::divide_negative(divide, r#"{"a": -7, "b": 2}"#, json!(-3))]
    #[case::fibonacci_zero(fibonacci, r#"{"n": 0}"#, json!(0))]
    #[case::fibonacci_ten(fibonacci, r#"{"n": 10}"#, json!(55))]
    #[case::fibonacci_ninety(fibonacci, r#"{"n": 90}"#, json!(2_880_067_194_370_816_120_i64))]
    #[case::factorial_zero(factorial, r#"{"n": 0}"#, json!(1))]
    #[case::factorial_five(factorial, r#"{"n": 5}"#, json!(120))]
    #[case::prime_two(is_prime, r#"{"n": 2}"#, json!(true))]
    #[case::prime_large(is_prime, r#"{"n": 7919}"#, json!(true))]
    #[case::square(is_prime, r#"{"n": 49}"#, json!(false))]
    #[case::one(is_prime, r#"{"n": 1}"#, json!(false))]
    fn computes_expected_values(
        #[case] function: fn(&Arguments) -> MethodResult,
        #[case] input: &str,
        #[case] expected: Value,
    ) {
        assert_eq!(function(&args(input)), Ok(expected));
    }

    #[rstest]
    #[case::zero_divisor(divide as fn(&Arguments) -> MethodResult, r#"{"a": 1, "b": 0}"#, "division by zero")]
    #[case::missing(add, r#"{"a": 1}"#, "Missing or invalid 'b'")]
    #[case::mistyped(multiply, r#"{"a": "1", "b": 2}"#, "Missing or invalid 'a'")]
    #[case::fibonacci_overflow(fibonacci, r#"{"n": 100}"#, "integer overflow")]
    #[case::factorial_overflow(factorial, r#"{"n": 21}"#, "integer overflow")]
    #[case::add_overflow(add, r#"{"a": 9223372036854775807, "b": 1}"#, "integer overflow")]
    fn reports_failures(
        #[case] function: fn(&Arguments) -> MethodResult,
        #[case] input: &str,
        #[case] message: &str,
    ) {
        let error = function(&args(input)).expect_err("call should fail");
        assert_eq!(error.message(), message);
    }

    #[test]
    fn counter_counts_per_session() {
        let first = Session::detached();
        let second = Session::detached();
        let none = Arguments::default();

        for expected in 1..=3 {
            assert_eq!(counter_increment(&first, &none), Ok(json!(expected)));
        }
        assert_eq!(counter_get(&first, &none), Ok(json!(3)));
        assert_eq!(counter_get(&second, &none), Ok(json!(0)));

        assert_eq!(counter_reset(&first, &none), Ok(json!(0)));
        assert_eq!(counter_increment(&first, &none), Ok(json!(1)));
    }

    #[test]
    fn manifest_declares_every_fixture() {
        let names = SimpleMath
            .manifest()
            .into_iter()
            .map(|entry| (entry.name, entry.metadata.is_stateful))
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            [
                ("add".to_owned(), false),
                ("multiply".to_owned(), false),
                ("divide".to_owned(), false),
                ("fibonacci".to_owned(), false),
                ("factorial".to_owned(), false),
                ("is_prime".to_owned(), false),
                ("counter_increment".to_owned(), true),
                ("counter_get".to_owned(), true),
                ("counter_reset".to_owned(), true),
            ]
        );
    }
}
