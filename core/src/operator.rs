//! Operator symbols and the predicate builders behind them.
//!
//! Every builder coerces its arguments first and type-gates the field; anything it cannot express
//! yields `None`, which drops the clause.
use crate::value::{coerce_all, DataType, ScalarType, Value};
use sieveql::plan::{ArrayMatchMode, ColumnExpr, ComparisonOperator, Predicate, SubstringPosition};
use sieveql::Clause;
use std::collections::HashMap;
use tracing::debug;

pub type OperatorFn = fn(&ColumnExpr, &[String], DataType) -> Option<Predicate>;

pub const EQ: &str = "$eq";
pub const EQ_CI: &str = "$eqL";
pub const NE: &str = "$ne";
pub const NE_CI: &str = "$neL";
pub const GT: &str = "$gt";
pub const GTE: &str = "$gte";
pub const LT: &str = "$lt";
pub const LTE: &str = "$lte";
pub const BETWEEN: &str = "$between";
pub const CONTAINS: &str = "$cont";
pub const CONTAINS_CI: &str = "$contL";
pub const EXCLUDES: &str = "$excl";
pub const EXCLUDES_CI: &str = "$exclL";
pub const STARTS: &str = "$starts";
pub const STARTS_CI: &str = "$startsL";
pub const ENDS: &str = "$ends";
pub const ENDS_CI: &str = "$endsL";
pub const IN: &str = "$in";
pub const IN_CI: &str = "$inL";
pub const NOT_IN: &str = "$notin";
pub const NOT_IN_CI: &str = "$notinL";
pub const IS_NULL: &str = "$isnull";
pub const NOT_NULL: &str = "$notnull";

#[derive(Clone)]
pub struct OperatorRegistry {
    operators: HashMap<String, OperatorFn>,
    default_operator: String,
}

impl Default for OperatorRegistry {
    fn default() -> Self { Self::new(CONTAINS) }
}

impl OperatorRegistry {
    /// The built-in operator set. `default_operator` stands in for omitted or unknown symbols on text-like fields.
    pub fn new(default_operator: impl Into<String>) -> Self {
        use ComparisonOperator::*;
        use SubstringPosition::*;

        let mut registry = Self { operators: HashMap::new(), default_operator: default_operator.into() };
        registry
            .register(EQ, |e, a, d| compare_each(e, a, d, Equal, false, Predicate::or))
            .register(EQ_CI, |e, a, d| compare_each(e, a, d, Equal, true, Predicate::or))
            .register(NE, |e, a, d| compare_each(e, a, d, NotEqual, false, Predicate::and))
            .register(NE_CI, |e, a, d| compare_each(e, a, d, NotEqual, true, Predicate::and))
            .register(GT, |e, a, d| range(e, a, d, GreaterThan))
            .register(GTE, |e, a, d| range(e, a, d, GreaterThanOrEqual))
            .register(LT, |e, a, d| range(e, a, d, LessThan))
            .register(LTE, |e, a, d| range(e, a, d, LessThanOrEqual))
            .register(BETWEEN, between)
            .register(CONTAINS, |e, a, d| match d {
                DataType::Array(_) => array_match(e, a, d, ArrayMatchMode::All),
                _ => substring(e, a, d, Anywhere, false, false),
            })
            .register(CONTAINS_CI, |e, a, d| substring(e, a, d, Anywhere, false, true))
            .register(EXCLUDES, |e, a, d| substring(e, a, d, Anywhere, true, false))
            .register(EXCLUDES_CI, |e, a, d| substring(e, a, d, Anywhere, true, true))
            .register(STARTS, |e, a, d| substring(e, a, d, Start, false, false))
            .register(STARTS_CI, |e, a, d| substring(e, a, d, Start, false, true))
            .register(ENDS, |e, a, d| substring(e, a, d, End, false, false))
            .register(ENDS_CI, |e, a, d| substring(e, a, d, End, false, true))
            .register(IN, |e, a, d| match d {
                DataType::Array(_) => array_match(e, a, d, ArrayMatchMode::Any),
                _ => membership(e, a, d, false, false),
            })
            .register(IN_CI, |e, a, d| membership(e, a, d, false, true))
            .register(NOT_IN, |e, a, d| membership(e, a, d, true, false))
            .register(NOT_IN_CI, |e, a, d| membership(e, a, d, true, true))
            .register(IS_NULL, |e, _, d| null_check(e, d, false))
            .register(NOT_NULL, |e, _, d| null_check(e, d, true));
        registry
    }

    /// Adds or replaces the builder for `symbol`.
    pub fn register(&mut self, symbol: impl Into<String>, operator: OperatorFn) -> &mut Self {
        self.operators.insert(symbol.into(), operator);
        self
    }

    pub fn contains(&self, symbol: &str) -> bool { self.operators.contains_key(symbol) }

    pub fn default_operator(&self) -> &str { &self.default_operator }

    /// Symbol used when a clause omits its operator or names an unknown one.
    pub fn fallback(&self, data_type: DataType) -> &str {
        match data_type {
            DataType::Scalar(scalar) if scalar.is_text_like() => &self.default_operator,
            DataType::Array(_) => CONTAINS,
            _ => EQ,
        }
    }

    pub fn predicate(&self, symbol: Option<&str>, expr: &ColumnExpr, args: &[String], data_type: DataType) -> Option<Predicate> {
        let (symbol, operator) = match symbol.and_then(|s| self.operators.get(s).map(|op| (s, op))) {
            Some(found) => found,
            None => {
                let fallback = self.fallback(data_type);
                if let Some(unknown) = symbol {
                    debug!("unknown operator '{}', using '{}'", unknown, fallback);
                }
                (fallback, self.operators.get(fallback)?)
            }
        };
        let predicate = operator(expr, args, data_type);
        if predicate.is_none() {
            debug!("operator '{}' dropped {:?} for {:?}", symbol, args, data_type);
        }
        predicate
    }

    /// Predicate for `clause` on `expr`, with the clause's own operator and arguments.
    pub fn build(&self, clause: &Clause, expr: &ColumnExpr, data_type: DataType) -> Option<Predicate> {
        self.predicate(clause.operator.as_deref(), expr, &clause.args, data_type)
    }
}

fn typed_args(args: &[String], scalar: ScalarType) -> Option<Vec<Value>> {
    if args.is_empty() {
        return None;
    }
    match coerce_all(args, scalar) {
        Ok(values) => Some(values),
        Err(e) => {
            debug!("dropping clause: {}", e);
            None
        }
    }
}

fn scalar_args(args: &[String], data_type: DataType) -> Option<(ScalarType, Vec<Value>)> {
    let scalar = data_type.scalar()?;
    typed_args(args, scalar).map(|values| (scalar, values))
}

fn compare_each(
    expr: &ColumnExpr,
    args: &[String],
    data_type: DataType,
    operator: ComparisonOperator,
    case_insensitive: bool,
    combine: fn(Vec<Predicate>) -> Predicate,
) -> Option<Predicate> {
    let (scalar, values) = scalar_args(args, data_type)?;
    if case_insensitive && !scalar.is_text_like() {
        return None;
    }
    Some(combine(values.into_iter().map(|value| Predicate::Compare { expr: expr.clone(), operator, value, case_insensitive }).collect()))
}

fn range(expr: &ColumnExpr, args: &[String], data_type: DataType, operator: ComparisonOperator) -> Option<Predicate> {
    let (scalar, mut values) = scalar_args(args, data_type)?;
    if !scalar.is_orderable() || values.len() != 1 {
        return None;
    }
    Some(Predicate::Compare { expr: expr.clone(), operator, value: values.remove(0), case_insensitive: false })
}

fn between(expr: &ColumnExpr, args: &[String], data_type: DataType) -> Option<Predicate> {
    let (scalar, mut values) = scalar_args(args, data_type)?;
    if !scalar.is_orderable() || values.len() != 2 {
        return None;
    }
    let high = values.pop()?;
    let low = values.pop()?;
    Some(Predicate::Between { expr: expr.clone(), low, high })
}

fn substring(
    expr: &ColumnExpr,
    args: &[String],
    data_type: DataType,
    position: SubstringPosition,
    negated: bool,
    case_insensitive: bool,
) -> Option<Predicate> {
    match data_type.scalar() {
        Some(scalar) if scalar.is_text_like() && !args.is_empty() => {}
        _ => return None,
    }
    let predicates = args
        .iter()
        .map(|needle| Predicate::Substring { expr: expr.clone(), needle: needle.clone(), position, negated, case_insensitive })
        .collect();
    Some(if negated { Predicate::and(predicates) } else { Predicate::or(predicates) })
}

fn membership(expr: &ColumnExpr, args: &[String], data_type: DataType, negated: bool, case_insensitive: bool) -> Option<Predicate> {
    let (scalar, values) = scalar_args(args, data_type)?;
    if case_insensitive && !scalar.is_text_like() {
        return None;
    }
    Some(Predicate::In { expr: expr.clone(), values, negated, case_insensitive })
}

fn array_match(expr: &ColumnExpr, args: &[String], data_type: DataType, mode: ArrayMatchMode) -> Option<Predicate> {
    let DataType::Array(element) = data_type else {
        return None;
    };
    let values = typed_args(args, element)?;
    Some(Predicate::ArrayMatch { expr: expr.clone(), values, mode })
}

fn null_check(expr: &ColumnExpr, data_type: DataType, negated: bool) -> Option<Predicate> {
    data_type.is_supported().then(|| Predicate::IsNull { expr: expr.clone(), negated })
}
