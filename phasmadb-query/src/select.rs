//! The client-side predicate AST (spec §4.2), before column names are
//! hashed and operands are encoded.
//!
//! Mirrors the combinator shape the original client library exposed:
//! `and`/`or` take a list of nodes and collapse a singleton list to that
//! node directly (`and([x]) ≡ x`), and `not` flips a group's polarity in
//! place rather than wrapping it in another layer (`not(not(x)) ≡ x`).

use phasmadb_crypto::TextMode;
use phasmadb_protocol::{GroupType, LeafOp};

/// A plaintext operand, still unencoded.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
	Int(u64),
	/// A `text` operator match against one token of a tokenized column.
	/// `TextMode::Plain` is whole-value equality; `Prefix`/`Word` match one
	/// token of a tokenized stored value.
	Token(TextMode, String),
}

/// A single named column, used to build leaf conditions fluently.
#[derive(Debug, Clone)]
pub struct Column(pub String);

impl Column {
	pub fn new(name: impl Into<String>) -> Self {
		Column(name.into())
	}

	fn leaf(&self, op: LeafOp, operand: Operand) -> Select {
		Select::Leaf { column: self.0.clone(), op, operand }
	}

	pub fn eq(&self, value: u64) -> Select {
		self.leaf(LeafOp::Eq, Operand::Int(value))
	}
	pub fn neq(&self, value: u64) -> Select {
		self.leaf(LeafOp::Neq, Operand::Int(value))
	}
	pub fn lt(&self, value: u64) -> Select {
		self.leaf(LeafOp::Lt, Operand::Int(value))
	}
	pub fn lte(&self, value: u64) -> Select {
		self.leaf(LeafOp::Lte, Operand::Int(value))
	}
	pub fn gt(&self, value: u64) -> Select {
		self.leaf(LeafOp::Gt, Operand::Int(value))
	}
	pub fn gte(&self, value: u64) -> Select {
		self.leaf(LeafOp::Gte, Operand::Int(value))
	}

	/// Whole-value text equality against a `text`/`unique_text` column. The
	/// wire form is the `text` operator with a single-token operand, which
	/// the server compiles as an equality predicate (spec §4.7); there is no
	/// `neq` for text columns — negate the whole leaf with [`not`] instead.
	pub fn eq_text(&self, value: impl Into<String>) -> Select {
		self.leaf(LeafOp::Text, Operand::Token(TextMode::Plain, value.into()))
	}

	/// Token match against a tokenized `text`/`unique_text` column.
	pub fn matches(&self, mode: TextMode, value: impl Into<String>) -> Select {
		self.leaf(LeafOp::Text, Operand::Token(mode, value.into()))
	}
}

/// A node in the client-side predicate tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Select {
	/// Matches every row.
	All,
	Group(GroupType, Vec<Select>),
	Leaf { column: String, op: LeafOp, operand: Operand },
}

/// `and([x]) ≡ x`; otherwise wrap in an `And` group.
pub fn and(children: Vec<Select>) -> Select {
	collapse(GroupType::And, children)
}

/// `or([x]) ≡ x`; otherwise wrap in an `Or` group.
pub fn or(children: Vec<Select>) -> Select {
	collapse(GroupType::Or, children)
}

fn collapse(group: GroupType, mut children: Vec<Select>) -> Select {
	if children.len() == 1 {
		return children.pop().expect("len checked above");
	}
	Select::Group(group, children)
}

/// Negate `node`. A group flips its polarity in place; a leaf is wrapped in
/// a singleton `not_and` group, since the wire form has no leaf-level
/// negation. `All` has no negation — the predicate language has no "match
/// nothing" sentinel — so this is a caller error to construct.
pub fn not(node: Select) -> Select {
	match node {
		Select::All => Select::Group(GroupType::NotAnd, vec![Select::All]),
		Select::Group(group, children) => Select::Group(group.negate(), children),
		leaf @ Select::Leaf { .. } => Select::Group(GroupType::NotAnd, vec![leaf]),
	}
}
