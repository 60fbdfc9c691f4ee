//! Schema and column model.
//!
//! Tables are declared in code: one free constructor per SQL type family
//! produces a [`ColumnDef`], fluent modifiers refine it, and [`table`]
//! assembles the ordered logical-name map. Definitions are immutable values;
//! every modifier returns a fresh definition so partially built ones can be
//! shared and branched.
//!
//! ```ignore
//! let posts = table("posts", vec![
//!     ("id", uuid().primary_key()),
//!     ("title", text().not_null()),
//!     ("published", boolean().default_value(false)),
//! ]);
//! ```
//!
//! The [`table!`](crate::table!) macro additionally generates a struct with
//! one [`Column`] field per declared column, giving statically checked
//! field-style access (`posts.published`) without any runtime reflection.

use crate::error::{OrmError, OrmResult};
use crate::ident;
use crate::value::Value;

/// SQL type tag for a column definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Varchar(u32),
    Integer,
    BigInt,
    Serial,
    Boolean,
    Uuid,
    Timestamp { with_timezone: bool },
    Date,
    Json,
    Jsonb,
    Numeric { precision: u8, scale: u8 },
    Real,
    DoublePrecision,
}

/// Default-value descriptor attached by `default_*` modifiers.
#[derive(Clone, Debug, PartialEq)]
pub enum DefaultValue {
    /// Current timestamp at insert time.
    Now,
    /// Randomly generated value (e.g. a UUID).
    Random,
    /// A literal value.
    Literal(Value),
}

/// Foreign-key reference to another table's column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
}

/// An immutable column definition.
///
/// The physical name defaults to the logical name the column is registered
/// under; override it with [`ColumnDef::physical`].
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnDef {
    sql_type: SqlType,
    physical: Option<String>,
    not_null: bool,
    has_default: bool,
    primary_key: bool,
    default: Option<DefaultValue>,
    references: Option<ForeignKey>,
}

impl ColumnDef {
    fn new(sql_type: SqlType) -> Self {
        Self {
            sql_type,
            physical: None,
            not_null: false,
            has_default: false,
            primary_key: false,
            default: None,
            references: None,
        }
    }

    /// Override the physical column name emitted in SQL.
    pub fn physical(&self, name: &str) -> Self {
        let mut def = self.clone();
        def.physical = Some(name.to_string());
        def
    }

    /// Mark the column NOT NULL.
    pub fn not_null(&self) -> Self {
        let mut def = self.clone();
        def.not_null = true;
        def
    }

    /// Attach a literal default value.
    pub fn default_value(&self, value: impl Into<Value>) -> Self {
        let mut def = self.clone();
        def.has_default = true;
        def.default = Some(DefaultValue::Literal(value.into()));
        def
    }

    /// Default to the current timestamp.
    pub fn default_now(&self) -> Self {
        let mut def = self.clone();
        def.has_default = true;
        def.default = Some(DefaultValue::Now);
        def
    }

    /// Default to a randomly generated value.
    pub fn default_random(&self) -> Self {
        let mut def = self.clone();
        def.has_default = true;
        def.default = Some(DefaultValue::Random);
        def
    }

    /// Mark the column as the table's primary key. Implies NOT NULL.
    pub fn primary_key(&self) -> Self {
        let mut def = self.clone();
        def.primary_key = true;
        def.not_null = true;
        def
    }

    /// Declare a foreign-key reference to another table's column.
    pub fn references(&self, column: &Column) -> Self {
        let mut def = self.clone();
        def.references = Some(ForeignKey {
            table: column.table().to_string(),
            column: column.physical().to_string(),
        });
        def
    }

    // Accessors. The definition is pure data; all behavior lives in the
    // compiler and the record layer.

    pub fn sql_type(&self) -> SqlType {
        self.sql_type
    }

    pub fn physical_name(&self) -> Option<&str> {
        self.physical.as_deref()
    }

    pub fn is_not_null(&self) -> bool {
        self.not_null
    }

    pub fn has_default(&self) -> bool {
        self.has_default
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn default(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    pub fn foreign_key(&self) -> Option<&ForeignKey> {
        self.references.as_ref()
    }
}

pub fn text() -> ColumnDef {
    ColumnDef::new(SqlType::Text)
}

pub fn varchar(length: u32) -> ColumnDef {
    ColumnDef::new(SqlType::Varchar(length))
}

pub fn integer() -> ColumnDef {
    ColumnDef::new(SqlType::Integer)
}

pub fn bigint() -> ColumnDef {
    ColumnDef::new(SqlType::BigInt)
}

pub fn serial() -> ColumnDef {
    ColumnDef::new(SqlType::Serial)
}

pub fn boolean() -> ColumnDef {
    ColumnDef::new(SqlType::Boolean)
}

pub fn uuid() -> ColumnDef {
    ColumnDef::new(SqlType::Uuid)
}

pub fn timestamp(with_timezone: bool) -> ColumnDef {
    ColumnDef::new(SqlType::Timestamp { with_timezone })
}

pub fn date() -> ColumnDef {
    ColumnDef::new(SqlType::Date)
}

pub fn json() -> ColumnDef {
    ColumnDef::new(SqlType::Json)
}

pub fn jsonb() -> ColumnDef {
    ColumnDef::new(SqlType::Jsonb)
}

pub fn numeric(precision: u8, scale: u8) -> ColumnDef {
    ColumnDef::new(SqlType::Numeric { precision, scale })
}

pub fn real() -> ColumnDef {
    ColumnDef::new(SqlType::Real)
}

pub fn double_precision() -> ColumnDef {
    ColumnDef::new(SqlType::DoublePrecision)
}

/// A lightweight handle naming one column of one table.
///
/// Condition operators, select items and ordering helpers all take handles;
/// the handle already carries the resolved physical name so rendering never
/// needs the table again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    table: String,
    logical: String,
    physical: String,
}

impl Column {
    pub(crate) fn new(table: &str, logical: &str, physical: &str) -> Self {
        Self {
            table: table.to_string(),
            logical: logical.to_string(),
            physical: physical.to_string(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn logical(&self) -> &str {
        &self.logical
    }

    pub fn physical(&self) -> &str {
        &self.physical
    }

    /// The quoted physical name as it appears in SQL text.
    pub(crate) fn quoted(&self) -> String {
        ident::quote(&self.physical)
    }

    /// The table-qualified quoted name, for contexts with several tables.
    pub(crate) fn qualified(&self) -> String {
        format!("{}.{}", ident::quote(&self.table), ident::quote(&self.physical))
    }
}

/// A table definition: a name plus an ordered logical-name column map.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<(String, ColumnDef)>,
}

/// Assemble a table definition.
///
/// # Panics
///
/// Panics if two columns share a logical name. Schema assembly happens at
/// startup from literals, so a duplicate is a programming error rather than
/// a runtime condition.
pub fn table(name: &str, columns: Vec<(&str, ColumnDef)>) -> Table {
    let mut assembled: Vec<(String, ColumnDef)> = Vec::with_capacity(columns.len());
    for (logical, def) in columns {
        assert!(
            !assembled.iter().any(|(existing, _)| existing == logical),
            "duplicate logical column name \"{logical}\" in table \"{name}\""
        );
        assembled.push((logical.to_string(), def));
    }
    Table {
        name: name.to_string(),
        columns: assembled,
    }
}

impl Table {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Structured access to a column definition by logical name.
    pub fn column(&self, logical: &str) -> Option<&ColumnDef> {
        self.columns
            .iter()
            .find(|(n, _)| n == logical)
            .map(|(_, def)| def)
    }

    /// Iterate columns in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &ColumnDef)> {
        self.columns.iter().map(|(n, def)| (n.as_str(), def))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Produce a [`Column`] handle for a logical name.
    ///
    /// Unknown names fall back to the logical name verbatim, which supports
    /// ad hoc aliases (e.g. aggregate result columns) without declaring them.
    pub fn column_ref(&self, logical: &str) -> Column {
        Column::new(&self.name, logical, self.resolve(logical))
    }

    /// Resolve a logical name to the physical name emitted in SQL.
    pub(crate) fn resolve<'a>(&'a self, logical: &'a str) -> &'a str {
        match self.column(logical) {
            Some(def) => def.physical_name().unwrap_or(logical),
            None => logical,
        }
    }

    /// The table's sole primary-key column.
    ///
    /// Exactly one column must carry the primary-key flag; zero or several
    /// (composite keys are unsupported) is an error.
    pub fn primary_key(&self) -> OrmResult<Column> {
        let mut found: Option<&str> = None;
        for (logical, def) in &self.columns {
            if def.is_primary_key() {
                if found.is_some() {
                    return Err(OrmError::NoPrimaryKey(format!(
                        "table \"{}\" declares multiple primary-key columns; composite keys are unsupported",
                        self.name
                    )));
                }
                found = Some(logical);
            }
        }
        match found {
            Some(logical) => Ok(self.column_ref(logical)),
            None => Err(OrmError::NoPrimaryKey(format!(
                "table \"{}\" has no primary-key column",
                self.name
            ))),
        }
    }
}

/// Declare a table and generate a typed accessor struct for it.
///
/// The struct carries the [`Table`] plus one [`Column`] handle per declared
/// column, so call sites write `posts.published` instead of
/// `posts.table.column_ref("published")`. A physical name differing from the
/// field name is written `field as "physical_name"`.
///
/// ```ignore
/// pgrecord::table! {
///     pub struct Posts => "posts" {
///         id: uuid().primary_key(),
///         title: text().not_null(),
///         read_time as "read_time": integer(),
///     }
/// }
///
/// let posts = Posts::new();
/// let stmt = select().from(&posts.table).filter(eq(&posts.title, "x"));
/// ```
#[macro_export]
macro_rules! table {
    (
        $vis:vis struct $name:ident => $table_name:literal {
            $( $field:ident $( as $physical:literal )? : $def:expr ),+ $(,)?
        }
    ) => {
        #[derive(Clone, Debug)]
        $vis struct $name {
            pub table: $crate::schema::Table,
            $( pub $field: $crate::schema::Column, )+
        }

        impl $name {
            $vis fn new() -> Self {
                let table = $crate::schema::table($table_name, vec![
                    $(
                        (stringify!($field), {
                            let def = $def;
                            $( let def = def.physical($physical); )?
                            def
                        }),
                    )+
                ]);
                Self {
                    $( $field: table.column_ref(stringify!($field)), )+
                    table,
                }
            }
        }

        impl ::std::default::Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}
