//! Boolean conditions under which a field or field set is present in a response:
//! `@include`/`@skip` variables and type conditions.

use crate::ast::DirectiveList;
use crate::ast::Value;
use std::collections::BTreeSet;
use std::fmt;

#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(tag = "kind", content = "value")]
pub enum BooleanExpression {
    True,
    False,
    Not(Box<BooleanExpression>),
    /// Never empty
    And(BTreeSet<BooleanExpression>),
    /// Never empty
    Or(BTreeSet<BooleanExpression>),
    /// True when the variable is true
    Variable(String),
    /// True when the object satisfies the type condition
    Type(String),
}

impl BooleanExpression {
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    pub fn type_condition(name: impl Into<String>) -> Self {
        Self::Type(name.into())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Conjunction of `operands`, or `True` if there are none
    pub fn and(operands: impl IntoIterator<Item = Self>) -> Self {
        let operands: BTreeSet<_> = operands.into_iter().collect();
        if operands.is_empty() {
            Self::True
        } else {
            Self::And(operands)
        }
    }

    /// Disjunction of `operands`, or `False` if there are none
    pub fn or(operands: impl IntoIterator<Item = Self>) -> Self {
        let operands: BTreeSet<_> = operands.into_iter().collect();
        if operands.is_empty() {
            Self::False
        } else {
            Self::Or(operands)
        }
    }

    /// Evaluate with the given variables set to true and the given type conditions satisfied
    pub fn evaluate(
        &self,
        variables: &BTreeSet<String>,
        type_conditions: &BTreeSet<String>,
    ) -> bool {
        match self {
            Self::True => true,
            Self::False => false,
            Self::Not(operand) => !operand.evaluate(variables, type_conditions),
            Self::And(operands) => operands
                .iter()
                .all(|operand| operand.evaluate(variables, type_conditions)),
            Self::Or(operands) => operands
                .iter()
                .any(|operand| operand.evaluate(variables, type_conditions)),
            Self::Variable(name) => variables.contains(name),
            Self::Type(name) => type_conditions.contains(name),
        }
    }

    /// Fold constants. `!!x` is left as is.
    pub fn simplify(&self) -> Self {
        match self {
            Self::Not(operand) => match operand.simplify() {
                Self::True => Self::False,
                Self::False => Self::True,
                other => other.not(),
            },
            Self::And(operands) => {
                let mut simplified = BTreeSet::new();
                for operand in operands {
                    match operand.simplify() {
                        Self::True => {}
                        Self::False => return Self::False,
                        other => {
                            simplified.insert(other);
                        }
                    }
                }
                collapse(simplified, Self::True, Self::And)
            }
            Self::Or(operands) => {
                let mut simplified = BTreeSet::new();
                for operand in operands {
                    match operand.simplify() {
                        Self::False => {}
                        Self::True => return Self::True,
                        other => {
                            simplified.insert(other);
                        }
                    }
                }
                collapse(simplified, Self::False, Self::Or)
            }
            Self::True | Self::False | Self::Variable(_) | Self::Type(_) => self.clone(),
        }
    }

    /// Names of the variables this expression depends on
    pub fn variables(&self) -> BTreeSet<&str> {
        let mut result = BTreeSet::new();
        let mut stack = vec![self];
        while let Some(expression) = stack.pop() {
            match expression {
                Self::Variable(name) => {
                    result.insert(name.as_str());
                }
                Self::Not(operand) => stack.push(operand),
                Self::And(operands) | Self::Or(operands) => stack.extend(operands),
                Self::True | Self::False | Self::Type(_) => {}
            }
        }
        result
    }

    /// The condition expressed by `@include` and `@skip` directives, simplified
    pub fn from_directives(directives: &DirectiveList) -> Self {
        let mut operands = Vec::new();
        for directive in directives {
            let negate = match directive.name.as_str() {
                "include" => false,
                "skip" => true,
                _ => continue,
            };
            let condition = match directive.argument_by_name("if").map(|value| &**value) {
                Some(Value::Boolean(value)) => {
                    if *value {
                        Self::True
                    } else {
                        Self::False
                    }
                }
                Some(Value::Variable(name)) => Self::variable(name.as_str()),
                // Rejected by validation
                _ => continue,
            };
            operands.push(if negate { condition.not() } else { condition });
        }
        Self::and(operands).simplify()
    }
}

fn collapse(
    mut operands: BTreeSet<BooleanExpression>,
    empty: BooleanExpression,
    make: fn(BTreeSet<BooleanExpression>) -> BooleanExpression,
) -> BooleanExpression {
    match operands.len() {
        0 => empty,
        1 => operands.pop_first().unwrap_or(empty),
        _ => make(operands),
    }
}

impl fmt::Display for BooleanExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => f.write_str("true"),
            Self::False => f.write_str("false"),
            Self::Not(operand) => write!(f, "!{operand}"),
            Self::And(operands) => write_joined(f, operands, " && "),
            Self::Or(operands) => write_joined(f, operands, " || "),
            Self::Variable(name) => write!(f, "${name}"),
            Self::Type(name) => f.write_str(name),
        }
    }
}

fn write_joined(
    f: &mut fmt::Formatter<'_>,
    operands: &BTreeSet<BooleanExpression>,
    separator: &str,
) -> fmt::Result {
    f.write_str("(")?;
    for (index, operand) in operands.iter().enumerate() {
        if index > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{operand}")?;
    }
    f.write_str(")")
}

#[cfg(test)]
mod tests {
    use super::BooleanExpression as E;
    use super::*;

    /// Every expression up to `depth` over two variables and one type condition
    fn expressions(depth: usize) -> Vec<E> {
        let mut all = vec![
            E::True,
            E::False,
            E::variable("a"),
            E::variable("b"),
            E::type_condition("A"),
        ];
        for _ in 0..depth {
            let previous = all.clone();
            for x in &previous {
                all.push(x.clone().not());
                for y in &previous {
                    all.push(E::and([x.clone(), y.clone()]));
                    all.push(E::or([x.clone(), y.clone()]));
                }
            }
        }
        all
    }

    fn environments() -> Vec<(BTreeSet<String>, BTreeSet<String>)> {
        let subsets = |items: &[&str]| -> Vec<BTreeSet<String>> {
            (0..1 << items.len())
                .map(|mask| {
                    items
                        .iter()
                        .enumerate()
                        .filter(|(index, _)| mask & (1 << index) != 0)
                        .map(|(_, item)| item.to_string())
                        .collect()
                })
                .collect()
        };
        let mut result = Vec::new();
        for variables in subsets(&["a", "b"]) {
            for types in subsets(&["A"]) {
                result.push((variables.clone(), types));
            }
        }
        result
    }

    #[test]
    fn simplify_preserves_meaning() {
        let environments = environments();
        for expression in expressions(1) {
            let simplified = expression.simplify();
            for (variables, types) in &environments {
                assert_eq!(
                    expression.evaluate(variables, types),
                    simplified.evaluate(variables, types),
                    "{expression} simplified to {simplified}"
                );
            }
        }
    }

    #[test]
    fn simplify_is_idempotent() {
        for expression in expressions(1) {
            let once = expression.simplify();
            assert_eq!(once.simplify(), once, "{expression}");
        }
    }

    #[test]
    fn or_with_false() {
        for x in expressions(1) {
            assert_eq!(E::or([E::False, x.clone()]).simplify(), x.simplify());
        }
    }

    #[test]
    fn constant_folding() {
        assert_eq!(E::and([E::True, E::variable("a")]).simplify(), E::variable("a"));
        assert_eq!(E::and([E::False, E::variable("a")]).simplify(), E::False);
        assert_eq!(E::or([E::True, E::variable("a")]).simplify(), E::True);
        assert_eq!(E::True.not().simplify(), E::False);
        assert_eq!(E::and([E::True]).simplify(), E::True);
        let double = E::variable("a").not().not();
        assert_eq!(double.simplify(), double);
    }

    #[test]
    fn never_empty() {
        assert_eq!(E::and([]), E::True);
        assert_eq!(E::or([]), E::False);
    }

    #[test]
    fn display() {
        let expression = E::and([E::variable("a").not(), E::type_condition("User")]);
        assert_eq!(expression.to_string(), "(!$a && User)");
    }
}
