//! HIR data model consumed by the pruner.
//!
//! Construction of these values is an external collaborator's job — nothing
//! in this module parses source text. It only defines the shapes the
//! collector, solver and transform read and mutate.

use serde::{Deserialize, Serialize};

/// Opaque numeric handle minted upstream; names an SSA-like temporary or a
/// named binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IdentifierId(pub u32);

/// Opaque numeric handle for a reactive scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScopeId(pub u32);

/// Index of an instruction within the function's linear instruction
/// numbering; used to find the scope active at a given point.
pub type InstructionId = u32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

/// The effect an operand's place has on the value it is read through.
/// `Capture`, `Mutate` and `Store` are the "mutable" effects; everything else
/// is non-mutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Effect {
    Read,
    Capture,
    Mutate,
    Store,
    Freeze,
}

impl Effect {
    pub fn is_mutable(self) -> bool {
        matches!(self, Effect::Capture | Effect::Mutate | Effect::Store)
    }
}

/// An occurrence of an identifier with a role (read/write) and effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub identifier: IdentifierId,
    pub effect: Effect,
}

impl Place {
    pub fn new(identifier: IdentifierId, effect: Effect) -> Self {
        Place { identifier, effect }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Argument {
    Regular(Place),
    Spread(Place),
}

impl Argument {
    pub fn place(&self) -> Place {
        match self {
            Argument::Regular(p) | Argument::Spread(p) => *p,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrayElement {
    Item(Place),
    Spread(Place),
    Hole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectPropertyKey {
    Static(String),
    Computed(Place),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectProperty {
    KeyValue { key: ObjectPropertyKey, value: Place },
    Spread(Place),
}

/// One slot of an array or object destructuring pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrayPatternElement {
    Item(Place),
    Rest(Place),
    Hole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectPatternProperty {
    Property(Place),
    Rest(Place),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DestructurePattern {
    Array(Vec<ArrayPatternElement>),
    Object(Vec<ObjectPatternProperty>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JsxAttribute {
    Named { name: String, value: Place },
    Spread(Place),
}

/// Every HIR value kind the collector classifies. This is the tagged-union
/// the collector dispatches over; see
/// `crate::collector::compute_memoization_inputs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstructionValue {
    ConditionalExpression {
        test: Place,
        consequent: Place,
        alternate: Place,
    },
    LogicalExpression {
        left: Place,
        right: Place,
    },
    SequenceExpression {
        /// Intermediate expressions evaluated for side effects only.
        discarded: Vec<Place>,
        value: Place,
    },
    JsxExpression {
        tag: Option<Place>,
        attributes: Vec<JsxAttribute>,
        children: Vec<Place>,
    },
    JsxFragment {
        children: Vec<Place>,
    },
    Primitive {
        raw: String,
    },
    TemplateLiteral {
        quasis: Vec<String>,
    },
    JsxText {
        value: String,
    },
    BinaryExpression {
        operator: String,
        left: Place,
        right: Place,
    },
    UnaryExpression {
        operator: String,
        operand: Place,
    },
    LoadGlobal {
        name: String,
    },
    PropertyDelete {
        object: Place,
        property: String,
    },
    ComputedDelete {
        object: Place,
        property: Place,
    },
    TypeCastExpression {
        value: Place,
    },
    LoadLocal {
        place: Place,
    },
    DeclareLocal {
        place: Place,
    },
    StoreLocal {
        lvalue: Place,
        value: Place,
    },
    Destructure {
        pattern: DestructurePattern,
        value: Place,
    },
    PropertyLoad {
        object: Place,
        property: String,
    },
    ComputedLoad {
        object: Place,
        property: Place,
    },
    ComputedStore {
        object: Place,
        property: Place,
        value: Place,
    },
    ArrayExpression {
        elements: Vec<ArrayElement>,
    },
    ObjectExpression {
        properties: Vec<ObjectProperty>,
    },
    NewExpression {
        callee: Place,
        args: Vec<Argument>,
    },
    CallExpression {
        callee: Place,
        args: Vec<Argument>,
    },
    MethodCall {
        receiver: Place,
        property: String,
        args: Vec<Argument>,
    },
    OptionalCall {
        callee: Place,
        args: Vec<Argument>,
        optional: bool,
    },
    PropertyStore {
        object: Place,
        property: String,
        value: Place,
    },
    FunctionExpression {
        captures: Vec<Place>,
    },
    RegExpLiteral {
        pattern: String,
        flags: String,
    },
    TaggedTemplateExpression {
        tag: Place,
        quasi_expressions: Vec<Place>,
    },
    /// A value kind the classification table does not recognize. Real HIR
    /// never constructs this directly; it exists so the collector's
    /// dispatch has an arm to route into `PrunerError::UnsupportedValueKind`
    /// for genuinely foreign value kinds (spec: "raise invariant").
    UnsupportedNode {
        kind: String,
    },
}

impl InstructionValue {
    /// A short machine name for the value kind, used in diagnostics and in
    /// `PrunerError::UnsupportedValueKind`.
    pub fn kind_name(&self) -> std::borrow::Cow<'static, str> {
        use std::borrow::Cow;
        match self {
            InstructionValue::ConditionalExpression { .. } => Cow::Borrowed("ConditionalExpression"),
            InstructionValue::LogicalExpression { .. } => Cow::Borrowed("LogicalExpression"),
            InstructionValue::SequenceExpression { .. } => Cow::Borrowed("SequenceExpression"),
            InstructionValue::JsxExpression { .. } => Cow::Borrowed("JsxExpression"),
            InstructionValue::JsxFragment { .. } => Cow::Borrowed("JsxFragment"),
            InstructionValue::Primitive { .. } => Cow::Borrowed("Primitive"),
            InstructionValue::TemplateLiteral { .. } => Cow::Borrowed("TemplateLiteral"),
            InstructionValue::JsxText { .. } => Cow::Borrowed("JSXText"),
            InstructionValue::BinaryExpression { .. } => Cow::Borrowed("BinaryExpression"),
            InstructionValue::UnaryExpression { .. } => Cow::Borrowed("UnaryExpression"),
            InstructionValue::LoadGlobal { .. } => Cow::Borrowed("LoadGlobal"),
            InstructionValue::PropertyDelete { .. } => Cow::Borrowed("PropertyDelete"),
            InstructionValue::ComputedDelete { .. } => Cow::Borrowed("ComputedDelete"),
            InstructionValue::TypeCastExpression { .. } => Cow::Borrowed("TypeCastExpression"),
            InstructionValue::LoadLocal { .. } => Cow::Borrowed("LoadLocal"),
            InstructionValue::DeclareLocal { .. } => Cow::Borrowed("DeclareLocal"),
            InstructionValue::StoreLocal { .. } => Cow::Borrowed("StoreLocal"),
            InstructionValue::Destructure { .. } => Cow::Borrowed("Destructure"),
            InstructionValue::PropertyLoad { .. } => Cow::Borrowed("PropertyLoad"),
            InstructionValue::ComputedLoad { .. } => Cow::Borrowed("ComputedLoad"),
            InstructionValue::ComputedStore { .. } => Cow::Borrowed("ComputedStore"),
            InstructionValue::ArrayExpression { .. } => Cow::Borrowed("ArrayExpression"),
            InstructionValue::ObjectExpression { .. } => Cow::Borrowed("ObjectExpression"),
            InstructionValue::NewExpression { .. } => Cow::Borrowed("NewExpression"),
            InstructionValue::CallExpression { .. } => Cow::Borrowed("CallExpression"),
            InstructionValue::MethodCall { .. } => Cow::Borrowed("MethodCall"),
            InstructionValue::OptionalCall { .. } => Cow::Borrowed("OptionalCall"),
            InstructionValue::PropertyStore { .. } => Cow::Borrowed("PropertyStore"),
            InstructionValue::FunctionExpression { .. } => Cow::Borrowed("FunctionExpression"),
            InstructionValue::RegExpLiteral { .. } => Cow::Borrowed("RegExpLiteral"),
            InstructionValue::TaggedTemplateExpression { .. } => {
                Cow::Borrowed("TaggedTemplateExpression")
            }
            InstructionValue::UnsupportedNode { kind } => Cow::Owned(kind.clone()),
        }
    }
}

/// One instruction: an optional lvalue, a value, a source location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instruction {
    pub id: InstructionId,
    pub lvalue: Option<Place>,
    pub value: InstructionValue,
    #[serde(default)]
    pub loc: SourceLocation,
}

/// A function's return; the only terminal kind the collector interprets
/// directly. Other terminal kinds only matter for traversal: the transform
/// and collector must still recurse into their nested blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Terminal {
    Return {
        id: InstructionId,
        value: Option<Place>,
    },
    If {
        id: InstructionId,
        test: Place,
        consequent: ReactiveBlock,
        alternate: Option<ReactiveBlock>,
    },
    Loop {
        id: InstructionId,
        body: ReactiveBlock,
    },
    Switch {
        id: InstructionId,
        test: Place,
        cases: Vec<ReactiveBlock>,
    },
    Label {
        id: InstructionId,
        block: ReactiveBlock,
    },
    Try {
        id: InstructionId,
        block: ReactiveBlock,
        handler: Option<ReactiveBlock>,
    },
}

impl Terminal {
    pub fn id(&self) -> InstructionId {
        match self {
            Terminal::Return { id, .. }
            | Terminal::If { id, .. }
            | Terminal::Loop { id, .. }
            | Terminal::Switch { id, .. }
            | Terminal::Label { id, .. }
            | Terminal::Try { id, .. } => *id,
        }
    }
}

/// One reactive scope's metadata, carried alongside the scope block it
/// wraps. `dependencies` is fixed at formation time by the (external) scope
/// formation pass; this crate never adds to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactiveScope {
    pub id: ScopeId,
    /// Ordered external dependencies, fixed at scope formation.
    pub dependencies: Vec<IdentifierId>,
    /// Identifiers first declared (written) inside this scope.
    pub declarations: Vec<IdentifierId>,
    /// Identifiers reassigned (written again after an earlier declaration)
    /// inside this scope.
    pub reassignments: Vec<IdentifierId>,
}

impl ReactiveScope {
    /// Every identifier this scope's keep-check considers: declarations
    /// unioned with reassignments.
    pub fn written_identifiers(&self) -> impl Iterator<Item = IdentifierId> + '_ {
        self.declarations.iter().chain(self.reassignments.iter()).copied()
    }
}

/// A node in the reactive function's statement tree: blocks, scopes,
/// terminals, instructions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReactiveStatement {
    Block(ReactiveBlock),
    Scope(ReactiveScopeBlock),
    Instruction(Instruction),
    Terminal(Terminal),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReactiveBlock(pub Vec<ReactiveStatement>);

impl ReactiveBlock {
    pub fn new(statements: Vec<ReactiveStatement>) -> Self {
        ReactiveBlock(statements)
    }
}

/// A reactive scope wrapping the instructions it memoizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactiveScopeBlock {
    pub scope: ReactiveScope,
    pub instructions: Vec<ReactiveStatement>,
}

/// Caller-supplied knobs that affect classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoizationOptions {
    pub memoize_jsx_elements: bool,
}

impl Default for MemoizationOptions {
    fn default() -> Self {
        MemoizationOptions {
            memoize_jsx_elements: false,
        }
    }
}

/// The mutable reactive function the pass consumes and rewrites in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactiveFunction {
    pub id: Option<IdentifierId>,
    pub params: Vec<Place>,
    pub body: ReactiveBlock,
}
