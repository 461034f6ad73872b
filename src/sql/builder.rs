//! Builds AND-joined WHERE predicates with positional placeholders that stay aligned with their arguments.

use crate::error::QueryError;
use crate::sql::params::{FilterValue, SqlArg};

/// Token in a clause template that is replaced by `$<n>`.
pub const MARKER: &str = "$%d";

/// Hands out 1-based positional parameter indexes.
#[derive(Clone, Debug)]
pub struct PlaceholderAllocator {
    next: usize,
}

impl PlaceholderAllocator {
    pub fn new(start: usize) -> Self {
        PlaceholderAllocator { next: start }
    }

    /// Index the next call to [`allocate`](Self::allocate) will return.
    pub fn peek(&self) -> usize {
        self.next
    }

    pub fn allocate(&mut self) -> usize {
        let n = self.next;
        self.next += 1;
        n
    }
}

impl Default for PlaceholderAllocator {
    fn default() -> Self {
        PlaceholderAllocator::new(1)
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Binding {
    /// One value per marker, in marker order.
    PerMarker(Vec<SqlArg>),
    /// One value shared by every marker.
    Repeated(SqlArg),
}

/// A predicate template with its bound values. Marker and value counts are checked on construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Clause {
    template: String,
    binding: Binding,
}

impl Clause {
    pub fn new<I>(template: impl Into<String>, values: I) -> Result<Self, QueryError>
    where
        I: IntoIterator,
        I::Item: Into<SqlArg>,
    {
        let template = template.into();
        let values: Vec<SqlArg> = values.into_iter().map(Into::into).collect();
        let markers = count_markers(&template);
        if markers != values.len() {
            return Err(QueryError::MalformedClause {
                template,
                markers,
                values: values.len(),
            });
        }
        Ok(Clause {
            template,
            binding: Binding::PerMarker(values),
        })
    }

    /// Clause whose markers all refer to the same single argument, e.g. one search term over several columns.
    pub fn repeated(template: impl Into<String>, value: impl Into<SqlArg>) -> Result<Self, QueryError> {
        let template = template.into();
        let markers = count_markers(&template);
        if markers == 0 {
            return Err(QueryError::MalformedClause {
                template,
                markers,
                values: 1,
            });
        }
        Ok(Clause {
            template,
            binding: Binding::Repeated(value.into()),
        })
    }

    /// Substitute markers left to right, consuming indexes from `placeholders` and appending to `args`.
    fn render(self, placeholders: &mut PlaceholderAllocator, args: &mut Vec<SqlArg>) -> String {
        let mut out = String::with_capacity(self.template.len() + 4);
        let mut parts = self.template.split(MARKER);
        if let Some(head) = parts.next() {
            out.push_str(head);
        }
        match self.binding {
            Binding::PerMarker(values) => {
                for part in parts {
                    out.push('$');
                    out.push_str(&placeholders.allocate().to_string());
                    out.push_str(part);
                }
                args.extend(values);
            }
            Binding::Repeated(value) => {
                let n = placeholders.allocate();
                for part in parts {
                    out.push('$');
                    out.push_str(&n.to_string());
                    out.push_str(part);
                }
                args.push(value);
            }
        }
        out
    }
}

fn count_markers(template: &str) -> usize {
    template.matches(MARKER).count()
}

/// Request-local builder: base query plus zero or more AND-joined clauses.
#[derive(Debug)]
pub struct QueryBuilder {
    base: String,
    clauses: Vec<String>,
    args: Vec<SqlArg>,
    placeholders: PlaceholderAllocator,
}

impl QueryBuilder {
    pub fn new(base: impl Into<String>) -> Self {
        QueryBuilder {
            base: base.into(),
            clauses: Vec::new(),
            args: Vec::new(),
            placeholders: PlaceholderAllocator::default(),
        }
    }

    pub fn push(&mut self, clause: Clause) -> &mut Self {
        let sql = clause.render(&mut self.placeholders, &mut self.args);
        self.clauses.push(sql);
        self
    }

    pub fn add_condition<I>(&mut self, template: &str, values: I) -> Result<&mut Self, QueryError>
    where
        I: IntoIterator,
        I::Item: Into<SqlArg>,
    {
        let clause = Clause::new(template, values)?;
        Ok(self.push(clause))
    }

    /// Adds the clause only when `value` is present; otherwise the builder is untouched.
    pub fn add_optional_condition(
        &mut self,
        template: &str,
        value: impl FilterValue,
    ) -> Result<&mut Self, QueryError> {
        match value.into_arg() {
            Some(arg) => self.add_condition(template, [arg]),
            None => Ok(self),
        }
    }

    pub fn add_repeated_condition(
        &mut self,
        template: &str,
        value: impl Into<SqlArg>,
    ) -> Result<&mut Self, QueryError> {
        let clause = Clause::repeated(template, value)?;
        Ok(self.push(clause))
    }

    /// Index the next placeholder appended after [`build`](Self::build) should use.
    pub fn next_index(&self) -> usize {
        self.placeholders.peek()
    }

    pub fn build(self) -> (String, Vec<SqlArg>) {
        let mut sql = self.base;
        for clause in &self.clauses {
            sql.push_str(" AND ");
            sql.push_str(clause);
        }
        (sql, self.args)
    }
}
