//! Range relation functions (`before`, `meets`, `overlaps`, ...).

use sfeel::BuiltinFunction;

use super::Args;
use crate::range::relate;
use crate::value::Value;

pub(super) fn apply(function: BuiltinFunction, args: &Args) -> Value {
    relate(function, args.get(0), args.get(1)).map_or(Value::Null, Value::Boolean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Range;
    use sfeel::RangeBound;

    fn range(low: f64, high: f64) -> Value {
        Value::from(
            Range::new(
                RangeBound::Closed,
                Some(Value::Number(low)),
                Some(Value::Number(high)),
                RangeBound::Closed,
            )
            .unwrap(),
        )
    }

    fn call(function: BuiltinFunction, left: Value, right: Value) -> Value {
        apply(function, &Args::new(function, vec![Some(left), Some(right)], vec![]))
    }

    #[test]
    fn test_relations_produce_booleans() {
        assert_eq!(call(BuiltinFunction::Before, range(1.0, 5.0), range(6.0, 8.0)), Value::Boolean(true));
        assert_eq!(call(BuiltinFunction::Overlaps, range(1.0, 5.0), range(3.0, 8.0)), Value::Boolean(true));
        assert_eq!(call(BuiltinFunction::Meets, range(1.0, 5.0), range(6.0, 8.0)), Value::Boolean(false));
    }

    #[test]
    fn test_null_operand_is_false() {
        assert_eq!(call(BuiltinFunction::Before, Value::Null, range(1.0, 2.0)), Value::Boolean(false));
    }
}
