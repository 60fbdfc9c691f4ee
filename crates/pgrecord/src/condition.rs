//! Condition expression tree.
//!
//! A closed set of predicate nodes that compile to SQL fragments with
//! positional `$n` placeholders. Compilation threads a single 1-based
//! parameter index through the tree: every node reports the next free index,
//! and composite nodes fold it left-to-right across their children, so
//! placeholder numbers always match parameter positions regardless of
//! nesting depth or where in a statement the tree is rendered (a join's ON
//! condition followed by a WHERE clause continues the same numbering).

use crate::schema::Column;
use crate::value::Value;

/// Comparison operator for a leaf predicate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    ILike,
}

impl CompareOp {
    fn as_sql(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Like => "LIKE",
            CompareOp::ILike => "ILIKE",
        }
    }
}

/// One node of the boolean predicate tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    Comparison {
        column: Column,
        op: CompareOp,
        value: Value,
    },
    In {
        column: Column,
        values: Vec<Value>,
    },
    NotIn {
        column: Column,
        values: Vec<Value>,
    },
    IsNull(Column),
    IsNotNull(Column),
    Between {
        column: Column,
        min: Value,
        max: Value,
    },
    /// Column-to-column equality, rendered table-qualified for join ON
    /// clauses where bare names would be ambiguous.
    ColumnEq { left: Column, right: Column },
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
}

/// The result of compiling a condition tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Compiled {
    pub sql: String,
    pub params: Vec<Value>,
    /// The next free placeholder index after this fragment.
    pub next_index: usize,
}

fn compare(column: &Column, op: CompareOp, value: impl Into<Value>) -> Condition {
    Condition::Comparison {
        column: column.clone(),
        op,
        value: value.into(),
    }
}

/// column = value
pub fn eq(column: &Column, value: impl Into<Value>) -> Condition {
    compare(column, CompareOp::Eq, value)
}

/// column != value
pub fn ne(column: &Column, value: impl Into<Value>) -> Condition {
    compare(column, CompareOp::Ne, value)
}

/// column > value
pub fn gt(column: &Column, value: impl Into<Value>) -> Condition {
    compare(column, CompareOp::Gt, value)
}

/// column >= value
pub fn gte(column: &Column, value: impl Into<Value>) -> Condition {
    compare(column, CompareOp::Gte, value)
}

/// column < value
pub fn lt(column: &Column, value: impl Into<Value>) -> Condition {
    compare(column, CompareOp::Lt, value)
}

/// column <= value
pub fn lte(column: &Column, value: impl Into<Value>) -> Condition {
    compare(column, CompareOp::Lte, value)
}

/// column LIKE pattern
pub fn like(column: &Column, pattern: impl Into<Value>) -> Condition {
    compare(column, CompareOp::Like, pattern)
}

/// column ILIKE pattern (case-insensitive)
pub fn ilike(column: &Column, pattern: impl Into<Value>) -> Condition {
    compare(column, CompareOp::ILike, pattern)
}

/// column IN (values...)
pub fn in_array<T: Into<Value>>(
    column: &Column,
    values: impl IntoIterator<Item = T>,
) -> Condition {
    Condition::In {
        column: column.clone(),
        values: values.into_iter().map(Into::into).collect(),
    }
}

/// column NOT IN (values...)
pub fn not_in_array<T: Into<Value>>(
    column: &Column,
    values: impl IntoIterator<Item = T>,
) -> Condition {
    Condition::NotIn {
        column: column.clone(),
        values: values.into_iter().map(Into::into).collect(),
    }
}

/// column IS NULL
pub fn is_null(column: &Column) -> Condition {
    Condition::IsNull(column.clone())
}

/// column IS NOT NULL
pub fn is_not_null(column: &Column) -> Condition {
    Condition::IsNotNull(column.clone())
}

/// left column = right column (no parameters consumed)
pub fn eq_col(left: &Column, right: &Column) -> Condition {
    Condition::ColumnEq {
        left: left.clone(),
        right: right.clone(),
    }
}

/// column BETWEEN min AND max
pub fn between(column: &Column, min: impl Into<Value>, max: impl Into<Value>) -> Condition {
    Condition::Between {
        column: column.clone(),
        min: min.into(),
        max: max.into(),
    }
}

/// All children must hold.
pub fn and(children: Vec<Condition>) -> Condition {
    Condition::And(children)
}

/// At least one child must hold.
pub fn or(children: Vec<Condition>) -> Condition {
    Condition::Or(children)
}

/// Negate a condition.
pub fn not(child: Condition) -> Condition {
    Condition::Not(Box::new(child))
}

impl Condition {
    /// Compile to SQL, numbering placeholders from `start_index` (1-based).
    ///
    /// Each leaf consumes as many placeholder slots as it has values and
    /// reports `next_index = start_index + consumed`.
    pub fn compile(&self, start_index: usize) -> Compiled {
        match self {
            Condition::Comparison { column, op, value } => Compiled {
                sql: format!("{} {} ${}", column.quoted(), op.as_sql(), start_index),
                params: vec![value.clone()],
                next_index: start_index + 1,
            },
            Condition::In { column, values } => Self::compile_in(column, values, false, start_index),
            Condition::NotIn { column, values } => {
                Self::compile_in(column, values, true, start_index)
            }
            Condition::IsNull(column) => Compiled {
                sql: format!("{} IS NULL", column.quoted()),
                params: Vec::new(),
                next_index: start_index,
            },
            Condition::IsNotNull(column) => Compiled {
                sql: format!("{} IS NOT NULL", column.quoted()),
                params: Vec::new(),
                next_index: start_index,
            },
            Condition::Between { column, min, max } => Compiled {
                sql: format!(
                    "{} BETWEEN ${} AND ${}",
                    column.quoted(),
                    start_index,
                    start_index + 1
                ),
                params: vec![min.clone(), max.clone()],
                next_index: start_index + 2,
            },
            Condition::ColumnEq { left, right } => Compiled {
                sql: format!("{} = {}", left.qualified(), right.qualified()),
                params: Vec::new(),
                next_index: start_index,
            },
            Condition::And(children) => Self::compile_group(children, "AND", "1=1", start_index),
            Condition::Or(children) => Self::compile_group(children, "OR", "1=0", start_index),
            Condition::Not(child) => {
                let inner = child.compile(start_index);
                Compiled {
                    sql: format!("NOT {}", inner.sql),
                    ..inner
                }
            }
        }
    }

    /// Total number of leaf values in the tree (placeholder slots consumed).
    pub fn param_count(&self) -> usize {
        match self {
            Condition::Comparison { .. } => 1,
            Condition::In { values, .. } | Condition::NotIn { values, .. } => values.len(),
            Condition::IsNull(_) | Condition::IsNotNull(_) | Condition::ColumnEq { .. } => 0,
            Condition::Between { .. } => 2,
            Condition::And(children) | Condition::Or(children) => {
                children.iter().map(Condition::param_count).sum()
            }
            Condition::Not(child) => child.param_count(),
        }
    }

    fn compile_in(column: &Column, values: &[Value], negated: bool, start_index: usize) -> Compiled {
        // An empty membership test cannot be rendered as `IN ()`; degrade to
        // a constant predicate the way empty groups do.
        if values.is_empty() {
            return Compiled {
                sql: if negated { "1=1" } else { "1=0" }.to_string(),
                params: Vec::new(),
                next_index: start_index,
            };
        }
        let placeholders: Vec<String> = (0..values.len())
            .map(|i| format!("${}", start_index + i))
            .collect();
        Compiled {
            sql: format!(
                "{} {} ({})",
                column.quoted(),
                if negated { "NOT IN" } else { "IN" },
                placeholders.join(", ")
            ),
            params: values.to_vec(),
            next_index: start_index + values.len(),
        }
    }

    fn compile_group(
        children: &[Condition],
        keyword: &str,
        empty_sql: &str,
        start_index: usize,
    ) -> Compiled {
        if children.is_empty() {
            return Compiled {
                sql: empty_sql.to_string(),
                params: Vec::new(),
                next_index: start_index,
            };
        }
        let mut params = Vec::new();
        let mut fragments = Vec::with_capacity(children.len());
        let mut index = start_index;
        for child in children {
            let compiled = child.compile(index);
            index = compiled.next_index;
            params.extend(compiled.params);
            fragments.push(compiled.sql);
        }
        Compiled {
            sql: format!("({})", fragments.join(&format!(" {keyword} "))),
            params,
            next_index: index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{boolean, integer, table, text, Table};
    use crate::value::Value;

    fn users() -> Table {
        table(
            "users",
            vec![
                ("id", integer().primary_key()),
                ("name", text()),
                ("age", integer()),
                ("active", boolean()),
            ],
        )
    }

    #[test]
    fn comparison_consumes_one_slot() {
        let t = users();
        let c = eq(&t.column_ref("name"), "alice");
        let compiled = c.compile(1);
        assert_eq!(compiled.sql, "\"name\" = $1");
        assert_eq!(compiled.params, vec![Value::Text("alice".to_string())]);
        assert_eq!(compiled.next_index, 2);
    }

    #[test]
    fn comparison_respects_start_index() {
        let t = users();
        let compiled = gt(&t.column_ref("age"), 18i64).compile(4);
        assert_eq!(compiled.sql, "\"age\" > $4");
        assert_eq!(compiled.next_index, 5);
    }

    #[test]
    fn in_array_consumes_len_slots() {
        let t = users();
        let compiled = in_array(&t.column_ref("id"), vec![1i64, 2, 3]).compile(2);
        assert_eq!(compiled.sql, "\"id\" IN ($2, $3, $4)");
        assert_eq!(compiled.params.len(), 3);
        assert_eq!(compiled.next_index, 5);
    }

    #[test]
    fn not_in_array_renders_not_in() {
        let t = users();
        let compiled = not_in_array(&t.column_ref("id"), vec![7i64]).compile(1);
        assert_eq!(compiled.sql, "\"id\" NOT IN ($1)");
    }

    #[test]
    fn empty_in_degrades_to_constant_false() {
        let t = users();
        let compiled = in_array::<i64>(&t.column_ref("id"), Vec::new()).compile(3);
        assert_eq!(compiled.sql, "1=0");
        assert_eq!(compiled.next_index, 3);
    }

    #[test]
    fn empty_not_in_degrades_to_constant_true() {
        let t = users();
        let compiled = not_in_array::<i64>(&t.column_ref("id"), Vec::new()).compile(3);
        assert_eq!(compiled.sql, "1=1");
    }

    #[test]
    fn null_checks_consume_no_slots() {
        let t = users();
        let compiled = is_null(&t.column_ref("name")).compile(5);
        assert_eq!(compiled.sql, "\"name\" IS NULL");
        assert_eq!(compiled.next_index, 5);
        let compiled = is_not_null(&t.column_ref("name")).compile(5);
        assert_eq!(compiled.sql, "\"name\" IS NOT NULL");
        assert_eq!(compiled.next_index, 5);
    }

    #[test]
    fn column_eq_renders_qualified_and_consumes_no_slots() {
        let users = users();
        let posts = table("posts", vec![("author_id", integer())]);
        let compiled =
            eq_col(&posts.column_ref("author_id"), &users.column_ref("id")).compile(3);
        assert_eq!(compiled.sql, "\"posts\".\"author_id\" = \"users\".\"id\"");
        assert!(compiled.params.is_empty());
        assert_eq!(compiled.next_index, 3);
    }

    #[test]
    fn between_consumes_two_slots() {
        let t = users();
        let compiled = between(&t.column_ref("age"), 18i64, 65i64).compile(3);
        assert_eq!(compiled.sql, "\"age\" BETWEEN $3 AND $4");
        assert_eq!(compiled.next_index, 5);
    }

    #[test]
    fn and_threads_index_left_to_right() {
        let t = users();
        let c = and(vec![
            eq(&t.column_ref("active"), true),
            in_array(&t.column_ref("id"), vec![1i64, 2]),
            gt(&t.column_ref("age"), 21i64),
        ]);
        let compiled = c.compile(1);
        assert_eq!(
            compiled.sql,
            "(\"active\" = $1 AND \"id\" IN ($2, $3) AND \"age\" > $4)"
        );
        assert_eq!(compiled.params.len(), 4);
        assert_eq!(compiled.next_index, 5);
    }

    #[test]
    fn nested_or_inside_and() {
        let t = users();
        let c = and(vec![
            eq(&t.column_ref("active"), true),
            or(vec![
                eq(&t.column_ref("name"), "admin"),
                eq(&t.column_ref("name"), "root"),
            ]),
        ]);
        let compiled = c.compile(1);
        assert_eq!(
            compiled.sql,
            "(\"active\" = $1 AND (\"name\" = $2 OR \"name\" = $3))"
        );
        assert_eq!(compiled.next_index, 4);
    }

    #[test]
    fn not_prefixes_child_output() {
        let t = users();
        let compiled = not(eq(&t.column_ref("active"), false)).compile(1);
        assert_eq!(compiled.sql, "NOT \"active\" = $1");
        assert_eq!(compiled.params, vec![Value::Bool(false)]);
        assert_eq!(compiled.next_index, 2);
    }

    #[test]
    fn consumed_slots_match_param_count_for_any_start() {
        let t = users();
        let tree = and(vec![
            not(or(vec![
                eq(&t.column_ref("name"), "a"),
                between(&t.column_ref("age"), 1i64, 9i64),
            ])),
            in_array(&t.column_ref("id"), vec![5i64, 6, 7]),
            is_not_null(&t.column_ref("name")),
        ]);
        let leaves = tree.param_count();
        assert_eq!(leaves, 6);
        for k in 1..=8 {
            let compiled = tree.compile(k);
            assert_eq!(compiled.next_index - k, leaves);
            assert_eq!(compiled.params.len(), leaves);
        }
    }

    #[test]
    fn and_composition_is_associative_in_param_order() {
        let t = users();
        let a = eq(&t.column_ref("name"), "x");
        let b = gt(&t.column_ref("age"), 1i64);
        let c = eq(&t.column_ref("active"), true);

        let flat = and(vec![a.clone(), b.clone(), c.clone()]).compile(1);
        let nested = and(vec![and(vec![a, b]), c]).compile(1);
        assert_eq!(flat.params, nested.params);
        assert_eq!(flat.next_index, nested.next_index);
    }
}
