//! Constraint selectors such as `%gcc` or `^root%clang`, parsed with `nom`.
//!
//! Grammar:
//!
//! ```text
//! selector   := clause ( '^' dep_clause )*
//! clause     := [ name ] term*
//! dep_clause := name term*
//! term       := '%' family | key '=' value
//! ```
//!
//! Whitespace is allowed between terms. The leading clause describes the
//! component under build; each `^` clause names a dependency that must be
//! present in its closure.

use std::fmt;
use std::str::FromStr;

use linkwise_common::error::{LinkwiseError, Result};
use linkwise_common::types::CompilerFamily;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::{all_consuming, not, opt, peek},
    multi::many0,
    sequence::{preceded, separated_pair, terminated},
};
use petgraph::graph::NodeIndex;

use crate::component::Component;
use crate::graph::DependencyGraph;

/// One constraint on a single component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clause {
    /// Required component name.
    pub name: Option<String>,
    /// Required compiler family.
    pub family: Option<CompilerFamily>,
    /// Required variant values, in textual form.
    pub variants: Vec<(String, String)>,
}

impl Clause {
    /// Tests `component`, using `family` in place of its recorded compiler
    /// family (the current build may override its own compiler).
    #[must_use]
    pub fn matches(&self, component: &Component, family: &CompilerFamily) -> bool {
        if let Some(name) = &self.name {
            if component.name() != name.as_str() {
                return false;
            }
        }
        if let Some(required) = &self.family {
            if required != family {
                return false;
            }
        }
        self.variants.iter().all(|(key, value)| {
            component
                .variants()
                .get(key)
                .is_some_and(|v| v.matches(value))
        })
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{name}")?;
        }
        if let Some(family) = &self.family {
            write!(f, "%{family}")?;
        }
        for (key, value) in &self.variants {
            write!(f, " {key}={value}")?;
        }
        Ok(())
    }
}

/// A parsed selector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    /// Constraint on the component under build.
    pub subject: Clause,
    /// Constraints on named dependencies; every clause has a name.
    pub dependencies: Vec<Clause>,
}

impl Selector {
    /// Tests the selector against the component at `root`.
    ///
    /// The subject clause is checked against `root` with `family` as its
    /// compiler family. Each dependency clause must match some component of
    /// that name among the dependencies of `root`, judged by its own
    /// recorded compiler.
    ///
    /// # Errors
    ///
    /// Returns a graph error if the closure of `root` is cyclic.
    pub fn matches(
        &self,
        graph: &DependencyGraph,
        root: NodeIndex,
        family: &CompilerFamily,
    ) -> Result<bool> {
        let closure = graph.closure(root)?;
        let Some((subject, deps)) = closure.split_first() else {
            return Ok(false);
        };
        if !self.subject.matches(subject, family) {
            return Ok(false);
        }
        Ok(self.dependencies.iter().all(|clause| {
            deps.iter()
                .any(|dep| clause.matches(dep, &dep.compiler().family))
        }))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.subject)?;
        for dep in &self.dependencies {
            write!(f, "^{dep}")?;
        }
        Ok(())
    }
}

impl FromStr for Selector {
    type Err = LinkwiseError;

    fn from_str(input: &str) -> Result<Self> {
        match all_consuming(terminated(selector, multispace0)).parse(input) {
            Ok((_, parsed)) => Ok(parsed),
            Err(e) => Err(LinkwiseError::Config {
                message: format!("invalid selector \"{input}\": {e}"),
            }),
        }
    }
}

enum Term {
    Family(String),
    Variant(String, String),
}

const fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+')
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(is_ident_char).parse(input)
}

fn variant_value(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && c != '^' && c != '%').parse(input)
}

fn family_term(input: &str) -> IResult<&str, Term> {
    preceded(char('%'), identifier)
        .map(|f: &str| Term::Family(f.to_string()))
        .parse(input)
}

fn variant_term(input: &str) -> IResult<&str, Term> {
    separated_pair(identifier, char('='), variant_value)
        .map(|(k, v): (&str, &str)| Term::Variant(k.to_string(), v.to_string()))
        .parse(input)
}

fn term(input: &str) -> IResult<&str, Term> {
    preceded(multispace0, alt((family_term, variant_term))).parse(input)
}

/// A bare identifier that is not the key of a `key=value` term.
fn name(input: &str) -> IResult<&str, &str> {
    terminated(identifier, not(peek(char('=')))).parse(input)
}

fn build_clause(name: Option<&str>, terms: Vec<Term>) -> Clause {
    let mut clause = Clause {
        name: name.map(str::to_string),
        ..Clause::default()
    };
    for term in terms {
        match term {
            Term::Family(f) => clause.family = Some(CompilerFamily::new(f)),
            Term::Variant(k, v) => clause.variants.push((k, v)),
        }
    }
    clause
}

fn subject_clause(input: &str) -> IResult<&str, Clause> {
    (preceded(multispace0, opt(name)), many0(term))
        .map(|(n, terms)| build_clause(n, terms))
        .parse(input)
}

fn dependency_clause(input: &str) -> IResult<&str, Clause> {
    preceded(
        (multispace0, char('^'), multispace0),
        (identifier, many0(term)),
    )
    .map(|(n, terms)| build_clause(Some(n), terms))
    .parse(input)
}

fn selector(input: &str) -> IResult<&str, Selector> {
    (subject_clause, many0(dependency_clause))
        .map(|(subject, dependencies)| Selector {
            subject,
            dependencies,
        })
        .parse(input)
}
