//! The expression checker: one method per syntactic form, plus the
//! dispatcher that maps node kinds onto them.
//!
//! Every method here assumes its node's children are already typed; the
//! post-order walker in [`crate::check_tree`] guarantees that. A method
//! either attaches a type to its node and returns `Ok(())`, or reports a
//! diagnostic and returns `Err(Fatal)`. Probe types built along the way
//! (builtin-membership checks, arithmetic probes, the sequence error
//! marker) are plain owned values and drop at scope exit.

use crate::caps::{cap_for_fun, cap_for_receiver};
use crate::{Checked, Fatal, PassResult};
use sablec_ast::{NodeId, NodeKind, SyntaxTree};
use sablec_types::{
    is_eqtype, is_subtype, join, tuple_index, union_of, MethodKind, MethodType, Nominal, Type,
    TypeDefs,
};
use sablec_util::diagnostic::{DiagnosticBuilder, Handler};
use sablec_util::symbol::{builtin, Symbol};
use tracing::{debug, trace};

/// The expression type-checking pass.
pub struct ExprChecker<'a> {
    tree: &'a mut SyntaxTree,
    defs: &'a TypeDefs,
    handler: &'a Handler,
}

impl<'a> ExprChecker<'a> {
    pub fn new(tree: &'a mut SyntaxTree, defs: &'a TypeDefs, handler: &'a Handler) -> Self {
        Self {
            tree,
            defs,
            handler,
        }
    }

    /// Post-order walk: type every child subtree, then dispatch the node
    /// itself. Siblings of a fatal subtree are still visited; the node is
    /// only dispatched when every child succeeded.
    pub fn check(&mut self, node: NodeId) -> PassResult {
        let children = self.tree.children(node).to_vec();
        let mut ok = true;
        for child in children {
            if self.check(child) == PassResult::Fatal {
                ok = false;
            }
        }

        if !ok {
            return PassResult::Fatal;
        }
        self.type_expr(node)
    }

    /// Dispatch a single node whose children are already typed.
    pub fn type_expr(&mut self, node: NodeId) -> PassResult {
        match self.dispatch(node) {
            Ok(()) => PassResult::Ok,
            Err(Fatal) => PassResult::Fatal,
        }
    }

    fn dispatch(&mut self, node: NodeId) -> Checked {
        trace!(?node, kind = ?self.tree.kind(node), "typing expression");

        match self.tree.kind(node) {
            NodeKind::Fvar | NodeKind::Flet | NodeKind::Param => self.field_decl(node),
            NodeKind::New | NodeKind::Be | NodeKind::Fun => self.method_decl(node),
            NodeKind::Seq => self.sequence(node),
            NodeKind::Var | NodeKind::Let => self.not_implemented(node, "local"),
            NodeKind::Continue | NodeKind::Break => self.loop_jump(node),
            NodeKind::Return => self.ret(node),
            NodeKind::Mul | NodeKind::Div | NodeKind::Mod | NodeKind::Add => {
                self.arithmetic(node)
            }
            NodeKind::Sub => self.minus(node),
            NodeKind::Shl | NodeKind::Shr => self.shift(node),
            NodeKind::Lt
            | NodeKind::Le
            | NodeKind::Ge
            | NodeKind::Gt
            | NodeKind::Eq
            | NodeKind::Ne => self.comparison(node),
            NodeKind::Is | NodeKind::Isnt => self.identity(node),
            NodeKind::And | NodeKind::Or | NodeKind::Xor => self.logical(node),
            NodeKind::Not => self.negation(node),
            NodeKind::Assign => self.assign(node),
            NodeKind::Consume => self.not_implemented(node, "consume"),
            NodeKind::Dot => self.dot(node),
            NodeKind::Qualify => self.not_implemented(node, "qualify"),
            NodeKind::Call => self.call(node),
            NodeKind::If => self.conditional(node),
            NodeKind::While => self.while_loop(node),
            NodeKind::Repeat => self.repeat_loop(node),
            NodeKind::For => self.not_implemented(node, "for"),
            NodeKind::Try => self.not_implemented(node, "try"),
            NodeKind::Tuple => self.tuple(node),
            NodeKind::Array => self.not_implemented(node, "array"),
            NodeKind::Object => self.not_implemented(node, "object"),
            NodeKind::Reference => self.reference(node),
            NodeKind::This => self.this_expr(node),
            NodeKind::Int(_) => self.literal(node, builtin::INT_LITERAL),
            NodeKind::Float(_) => self.literal(node, builtin::FLOAT_LITERAL),
            NodeKind::Str(_) => self.literal(node, builtin::STRING),
            NodeKind::Bool(_) => self.literal(node, builtin::BOOL),
            NodeKind::Error => self.error_expr(node),
            _ => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    fn error(&self, at: NodeId, message: impl Into<String>) {
        let message = message.into();
        debug!(%message, "type error");
        DiagnosticBuilder::error(message)
            .span(self.tree.span(at))
            .emit(self.handler);
    }

    fn note(&self, at: NodeId, message: impl Into<String>) {
        DiagnosticBuilder::note(message)
            .span(self.tree.span(at))
            .emit(self.handler);
    }

    fn not_implemented(&self, node: NodeId, what: &str) -> Checked {
        self.error(node, format!("not implemented ({})", what));
        Err(Fatal)
    }

    // ------------------------------------------------------------------
    // Small helpers
    // ------------------------------------------------------------------

    /// The already-inferred type of an expression child.
    fn expr_ty(&self, node: NodeId) -> Result<Type, Fatal> {
        self.tree.ty(node).cloned().ok_or(Fatal)
    }

    fn operands(&self, node: NodeId) -> Result<(NodeId, NodeId), Fatal> {
        match (self.tree.child(node, 0), self.tree.child(node, 1)) {
            (Some(left), Some(right)) => Ok((left, right)),
            _ => Err(Fatal),
        }
    }

    /// If the node's type is a subtype of the builtin `name`, return it.
    fn type_builtin(&self, node: NodeId, name: Symbol) -> Option<Type> {
        let ty = self.tree.ty(node)?;
        let probe = Type::builtin(name);
        if is_subtype(self.defs, ty, &probe) {
            Some(ty.clone())
        } else {
            None
        }
    }

    fn type_bool(&self, node: NodeId) -> Option<Type> {
        self.type_builtin(node, builtin::BOOL)
    }

    fn type_int(&self, node: NodeId) -> Option<Type> {
        self.type_builtin(node, builtin::INTEGER)
    }

    fn type_arithmetic(&self, node: NodeId) -> Option<Type> {
        self.type_builtin(node, builtin::ARITHMETIC)
    }

    fn type_int_or_bool(&self, node: NodeId) -> Option<Type> {
        let ty = self.type_bool(node).or_else(|| self.type_int(node));
        if ty.is_none() {
            self.error(node, "expected Bool or an integer type");
        }
        ty
    }

    /// The definition must textually precede the use.
    fn def_before_use(&self, def: NodeId, site: NodeId, name: Symbol) -> Checked {
        if self.tree.span(def).follows(&self.tree.span(site)) {
            self.error(site, format!("declaration of '{}' appears after use", name));
            self.note(def, format!("declaration of '{}' appears here", name));
            return Err(Fatal);
        }
        Ok(())
    }

    /// An expression shape admissible on the left of an assignment.
    fn is_lvalue(&self, node: NodeId) -> bool {
        match self.tree.kind(node) {
            // a reference or member access may still fail the assignment
            // itself; the shape alone is what qualifies here
            NodeKind::Reference | NodeKind::Dot => true,
            NodeKind::Tuple => self
                .tree
                .children(node)
                .iter()
                .all(|&child| self.is_lvalue(child)),
            _ => false,
        }
    }

    /// Reshape a method declaration into its signature view: parameter
    /// types only, no body.
    fn type_for_fun(&self, def: NodeId) -> Result<Type, Fatal> {
        let kind = match self.tree.kind(def) {
            NodeKind::New => MethodKind::New,
            NodeKind::Be => MethodKind::Be,
            NodeKind::Fun => MethodKind::Fun,
            _ => return Err(Fatal),
        };

        let cap = match self.tree.kind(self.tree.child(def, 0).ok_or(Fatal)?) {
            NodeKind::Cap(cap) => Some(cap),
            _ => None,
        };
        let name = self.tree.decl_name(def).ok_or(Fatal)?;

        let mut type_params = Vec::new();
        let typeparams = self.tree.child(def, 2).ok_or(Fatal)?;
        if self.tree.kind(typeparams) == NodeKind::TypeParams {
            for &param in self.tree.children(typeparams) {
                if let Some(param_name) = self.tree.decl_name(param) {
                    type_params.push(param_name);
                }
            }
        }

        let mut params = Vec::new();
        let params_node = self.tree.child(def, 3).ok_or(Fatal)?;
        if self.tree.kind(params_node) == NodeKind::Params {
            for &param in self.tree.children(params_node) {
                let annotation = self.tree.child(param, 1).ok_or(Fatal)?;
                params.push(self.tree.ty(annotation).cloned().unwrap_or_else(Type::none));
            }
        }

        let result = self
            .tree
            .ty(self.tree.child(def, 4).ok_or(Fatal)?)
            .cloned();
        let partial =
            self.tree.kind(self.tree.child(def, 5).ok_or(Fatal)?) == NodeKind::Question;

        Ok(Type::Method(Box::new(MethodType {
            kind,
            cap,
            name,
            type_params,
            params,
            result,
            partial,
        })))
    }

    // ------------------------------------------------------------------
    // Primary expressions
    // ------------------------------------------------------------------

    fn literal(&mut self, node: NodeId, name: Symbol) -> Checked {
        self.tree.set_ty(node, Type::builtin(name));
        Ok(())
    }

    fn this_expr(&mut self, node: NodeId) -> Checked {
        let Some(def) = self.tree.enclosing_type(node) else {
            debug_assert!(false, "'this' outside of a type declaration");
            return Err(Fatal);
        };

        let name = self.tree.decl_name(def).ok_or(Fatal)?;

        // the receiver's type arguments mirror the enclosing declaration's
        // type parameters
        let mut args = Vec::new();
        let typeparams = self.tree.child(def, 1).ok_or(Fatal)?;
        if self.tree.kind(typeparams) == NodeKind::TypeParams {
            for &param in self.tree.children(typeparams) {
                if let Some(param_name) = self.tree.decl_name(param) {
                    args.push(Type::nominal(None, param_name));
                }
            }
        }

        let ty = Type::Nominal(Nominal {
            package: None,
            name,
            args,
            cap: Some(cap_for_receiver(self.tree, node)),
            ephemeral: false,
        });
        self.tree.set_ty(node, ty);
        Ok(())
    }

    fn reference(&mut self, node: NodeId) -> Checked {
        let id = self.tree.first_child(node).ok_or(Fatal)?;
        let name = self.tree.name(id).ok_or(Fatal)?;

        let Some(def) = self.tree.lookup(node, name) else {
            self.error(node, format!("can't find declaration of '{}'", name));
            return Err(Fatal);
        };

        match self.tree.kind(def) {
            NodeKind::Package => {
                // only legal as the prefix of a member access; the dot
                // resolves the type, so the reference itself stays untyped
                let under_dot = self
                    .tree
                    .parent(node)
                    .is_some_and(|p| self.tree.kind(p) == NodeKind::Dot);
                if !under_dot {
                    self.error(node, "a package can only appear as a prefix to a type");
                    return Err(Fatal);
                }
                Ok(())
            }

            NodeKind::TypeAlias | NodeKind::Trait | NodeKind::Class | NodeKind::Actor => {
                // a bare type name; it may still be missing type arguments
                let type_name = self.tree.decl_name(def).ok_or(Fatal)?;
                self.tree.set_ty(node, Type::nominal(None, type_name));
                Ok(())
            }

            NodeKind::Fvar | NodeKind::Flet | NodeKind::Param => {
                self.def_before_use(def, node, name)?;
                let ty = self.expr_ty(def)?;
                self.tree.set_ty(node, ty);
                Ok(())
            }

            NodeKind::New | NodeKind::Be | NodeKind::Fun => {
                let ty = self.type_for_fun(def)?;
                self.tree.set_ty(node, ty);
                Ok(())
            }

            NodeKind::IdSeq => {
                self.def_before_use(def, node, name)?;
                self.not_implemented(node, "reference local")
            }

            _ => {
                debug_assert!(false, "unexpected definition kind for '{}'", name);
                Err(Fatal)
            }
        }
    }

    fn dot(&mut self, node: NodeId) -> Checked {
        let (left, right) = self.operands(node)?;

        match self.tree.kind(right) {
            NodeKind::Id(type_name) => {
                if self.tree.ty(left).is_some() {
                    // field or method access on a typed expression
                    return self.not_implemented(node, "dot");
                }

                // an untyped prefix names a package
                let left_id = self.tree.first_child(left).ok_or(Fatal)?;
                let package_name = self.tree.name(left_id).ok_or(Fatal)?;
                let package = self.tree.lookup(left, package_name).ok_or(Fatal)?;
                if self.tree.kind(package) != NodeKind::Package {
                    debug_assert!(false, "untyped dot prefix is not a package");
                    return Err(Fatal);
                }

                if self.tree.lookup_in(package, type_name).is_none() {
                    self.error(
                        right,
                        format!(
                            "can't find type '{}' in package '{}'",
                            type_name, package_name
                        ),
                    );
                    return Err(Fatal);
                }

                self.tree
                    .set_ty(node, Type::nominal(Some(package_name), type_name));
                Ok(())
            }

            NodeKind::Int(index) => {
                let element = match self.tree.ty(left) {
                    Some(ty @ Type::Tuple(..)) if index >= 0 => {
                        tuple_index(ty, index as u64).cloned()
                    }
                    Some(Type::Tuple(..)) => None,
                    _ => {
                        self.error(right, "member by position can only be used on a tuple");
                        return Err(Fatal);
                    }
                };

                let Some(element) = element else {
                    self.error(right, "tuple index is out of bounds");
                    return Err(Fatal);
                };

                self.tree.set_ty(node, element);
                Ok(())
            }

            _ => {
                debug_assert!(false, "malformed member access");
                Err(Fatal)
            }
        }
    }

    // ------------------------------------------------------------------
    // Operators
    // ------------------------------------------------------------------

    fn identity(&mut self, node: NodeId) -> Checked {
        let (left, right) = self.operands(node)?;

        if join(self.defs, self.tree.ty(left), self.tree.ty(right)).is_none() {
            self.error(node, "left and right side must have related types");
            return Err(Fatal);
        }

        self.tree.set_ty(node, Type::bool());
        Ok(())
    }

    fn comparison(&mut self, node: NodeId) -> Checked {
        let (left, right) = self.operands(node)?;

        let l_probe = self.type_arithmetic(left);
        let r_probe = self.type_arithmetic(right);

        if join(self.defs, l_probe.as_ref(), r_probe.as_ref()).is_none() {
            // non-arithmetic comparison: accept a right side that is a
            // subtype of the left
            let l_ty = self.expr_ty(left)?;
            let r_ty = self.expr_ty(right)?;

            if !is_subtype(self.defs, &r_ty, &l_ty) {
                self.error(node, "right side must be a subtype of left side");
                return Err(Fatal);
            }

            // TODO: require the left side to provide Comparable (Ordered
            // for the ordering operators) before accepting this fallback
        }

        self.tree.set_ty(node, Type::bool());
        Ok(())
    }

    fn arithmetic(&mut self, node: NodeId) -> Checked {
        let (left, right) = self.operands(node)?;

        let l_probe = self.type_arithmetic(left);
        let r_probe = self.type_arithmetic(right);

        match join(self.defs, l_probe.as_ref(), r_probe.as_ref()).cloned() {
            Some(ty) => {
                self.tree.set_ty(node, ty);
                Ok(())
            }
            None => {
                self.error(node, "left and right side must have related arithmetic types");
                Err(Fatal)
            }
        }
    }

    fn minus(&mut self, node: NodeId) -> Checked {
        let left = self.tree.first_child(node).ok_or(Fatal)?;
        let l_probe = self.type_arithmetic(left);

        let ty = match self.tree.child(node, 1) {
            Some(right) => {
                let r_probe = self.type_arithmetic(right);
                let joined = join(self.defs, l_probe.as_ref(), r_probe.as_ref()).cloned();
                if joined.is_none() {
                    self.error(node, "left and right side must have related arithmetic types");
                }
                joined
            }
            None => {
                // unary negation
                if l_probe.is_none() {
                    self.error(node, "must have an arithmetic type");
                }
                l_probe
            }
        };

        match ty {
            Some(ty) => {
                self.tree.set_ty(node, ty);
                Ok(())
            }
            None => Err(Fatal),
        }
    }

    fn shift(&mut self, node: NodeId) -> Checked {
        let (left, right) = self.operands(node)?;

        match (self.type_int(left), self.type_int(right)) {
            (Some(l_ty), Some(_)) => {
                // the result keeps the left operand's type
                self.tree.set_ty(node, l_ty);
                Ok(())
            }
            _ => {
                self.error(node, "left and right side must have integer types");
                Err(Fatal)
            }
        }
    }

    fn logical(&mut self, node: NodeId) -> Checked {
        let (left, right) = self.operands(node)?;

        // bitwise on integers, logical on Bool; the operand types decide
        let l_probe = self.type_int_or_bool(left);
        let r_probe = self.type_int_or_bool(right);

        match join(self.defs, l_probe.as_ref(), r_probe.as_ref()).cloned() {
            Some(ty) => {
                self.tree.set_ty(node, ty);
                Ok(())
            }
            None => {
                self.error(
                    node,
                    "left and right side must have related integer or boolean types",
                );
                Err(Fatal)
            }
        }
    }

    fn negation(&mut self, node: NodeId) -> Checked {
        let operand = self.tree.first_child(node).ok_or(Fatal)?;

        match self.type_int_or_bool(operand) {
            Some(ty) => {
                self.tree.set_ty(node, ty);
                Ok(())
            }
            None => Err(Fatal),
        }
    }

    // ------------------------------------------------------------------
    // Composite expressions
    // ------------------------------------------------------------------

    fn tuple(&mut self, node: NodeId) -> Checked {
        let children = self.tree.children(node).to_vec();
        let mut elements = Vec::with_capacity(children.len());
        for child in children {
            elements.push(self.expr_ty(child)?);
        }

        // a 1-tuple collapses to its element
        let ty = Type::tuple_of(elements).ok_or(Fatal)?;
        self.tree.set_ty(node, ty);
        Ok(())
    }

    fn sequence(&mut self, node: NodeId) -> Checked {
        let children = self.tree.children(node).to_vec();

        let mut can_fail = false;
        let mut last_ty = None;
        for child in children {
            let ty = self.expr_ty(child)?;
            can_fail |= is_subtype(self.defs, &Type::Error, &ty);
            last_ty = Some(ty);
        }

        let last_ty = last_ty.ok_or(Fatal)?;
        let ty = if can_fail {
            union_of(self.defs, last_ty, Type::Error)
        } else {
            last_ty
        };
        self.tree.set_ty(node, ty);
        Ok(())
    }

    fn call(&mut self, node: NodeId) -> Checked {
        let callee = self.tree.first_child(node).ok_or(Fatal)?;

        match self.expr_ty(callee)? {
            Type::Method(method) => {
                let receiver = cap_for_receiver(self.tree, node);
                let required = cap_for_fun(&method);

                if !receiver.is_sub(required) {
                    self.error(
                        node,
                        "receiver capability is not a subtype of method capability",
                    );
                    return Err(Fatal);
                }

                // TODO: solve unbound type parameters from the arguments
                // TODO: fold a partial callee's may-error into the
                // enclosing sequence
                let result = method.result.clone().unwrap_or_else(Type::none);
                self.tree.set_ty(node, result);
                Ok(())
            }

            Type::Union(..)
            | Type::Isect(..)
            | Type::Nominal(..)
            | Type::Structural
            | Type::Arrow(..)
            | Type::Error => self.not_implemented(node, "apply sugar"),

            Type::Tuple(..) => {
                self.error(node, "can't call a tuple type");
                Err(Fatal)
            }
        }
    }

    fn assign(&mut self, node: NodeId) -> Checked {
        let (left, right) = self.operands(node)?;
        let l_ty = self.expr_ty(left)?;
        let r_ty = self.expr_ty(right)?;

        if !self.is_lvalue(left) {
            self.error(node, "left side must be something that can be assigned to");
            return Err(Fatal);
        }

        if !is_subtype(self.defs, &r_ty, &l_ty) {
            self.error(node, "right side must be a subtype of left side");
            return Err(Fatal);
        }

        self.tree.set_ty(node, l_ty);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Control flow
    // ------------------------------------------------------------------

    fn conditional(&mut self, node: NodeId) -> Checked {
        let cond = self.tree.child(node, 0).ok_or(Fatal)?;
        let then_branch = self.tree.child(node, 1).ok_or(Fatal)?;
        let else_branch = self.tree.child(node, 2).ok_or(Fatal)?;

        if self.type_bool(cond).is_none() {
            self.error(cond, "condition must be a Bool");
            return Err(Fatal);
        }

        let then_ty = self.expr_ty(then_branch)?;
        let else_ty = if self.tree.kind(else_branch) == NodeKind::None {
            Type::none()
        } else {
            self.expr_ty(else_branch)?
        };

        let ty = union_of(self.defs, then_ty, else_ty);
        self.tree.set_ty(node, ty);
        Ok(())
    }

    fn while_loop(&mut self, node: NodeId) -> Checked {
        let cond = self.tree.child(node, 0).ok_or(Fatal)?;

        if self.type_bool(cond).is_none() {
            self.error(cond, "condition must be a Bool");
            return Err(Fatal);
        }

        self.tree.set_ty(node, Type::none());
        Ok(())
    }

    fn repeat_loop(&mut self, node: NodeId) -> Checked {
        // the condition is read after the body
        let cond = self.tree.child(node, 1).ok_or(Fatal)?;

        if self.type_bool(cond).is_none() {
            self.error(cond, "condition must be a Bool");
            return Err(Fatal);
        }

        self.tree.set_ty(node, Type::none());
        Ok(())
    }

    fn loop_jump(&mut self, node: NodeId) -> Checked {
        if self.tree.enclosing_loop(node).is_none() {
            self.error(node, "must be in a loop");
            return Err(Fatal);
        }

        if let Some(next) = self.tree.next_sibling(node) {
            self.error(node, "must be the last expression in a sequence");
            self.note(next, "is followed with this expression");
            return Err(Fatal);
        }

        self.tree.set_ty(node, Type::none());
        Ok(())
    }

    fn ret(&mut self, node: NodeId) -> Checked {
        let value = self.tree.first_child(node).ok_or(Fatal)?;
        let value_ty = if self.tree.kind(value) == NodeKind::None {
            Type::none()
        } else {
            self.expr_ty(value)?
        };

        let Some(method) = self.tree.enclosing_method(node) else {
            self.error(node, "return must occur in a function or a behaviour body");
            return Err(Fatal);
        };

        let mut ok = true;
        if let Some(next) = self.tree.next_sibling(node) {
            self.error(node, "must be the last expression in a sequence");
            self.note(next, "is followed with this expression");
            ok = false;
        }

        match self.tree.kind(method) {
            NodeKind::New => {
                self.error(node, "cannot return in a constructor");
                return Err(Fatal);
            }

            NodeKind::Be => {
                if !is_subtype(self.defs, &value_ty, &Type::none()) {
                    self.error(value, "body of a return in a behaviour must have type None");
                    ok = false;
                }
            }

            NodeKind::Fun => {
                let result_node = self.tree.child(method, 4).ok_or(Fatal)?;
                let expected = self.tree.ty(result_node).cloned().unwrap_or_else(Type::none);

                if !is_subtype(self.defs, &value_ty, &expected) {
                    self.error(value, "body of return doesn't match the function return type");
                    ok = false;
                }
            }

            _ => return Err(Fatal),
        }

        if !ok {
            return Err(Fatal);
        }
        self.tree.set_ty(node, value_ty);
        Ok(())
    }

    fn error_expr(&mut self, node: NodeId) -> Checked {
        if let Some(next) = self.tree.next_sibling(node) {
            self.error(node, "error must be the last expression in a sequence");
            self.note(next, "error is followed with this expression");
            return Err(Fatal);
        }

        self.tree.set_ty(node, Type::Error);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    fn field_decl(&mut self, node: NodeId) -> Checked {
        let annotation = self.tree.child(node, 1).ok_or(Fatal)?;
        let init = self.tree.child(node, 2).ok_or(Fatal)?;

        let declared = self.tree.ty(annotation).cloned();
        let has_init = self.tree.kind(init) != NodeKind::None;

        match (declared, has_init) {
            (None, false) => {
                self.error(node, "field/param needs a type or an initialiser");
                Err(Fatal)
            }

            (None, true) => {
                // no annotation: the initialiser decides
                let ty = self.expr_ty(init)?;
                self.tree.set_ty(node, ty);
                Ok(())
            }

            (Some(declared), true) => {
                let init_ty = self.expr_ty(init)?;
                if !is_subtype(self.defs, &init_ty, &declared) {
                    self.error(
                        init,
                        "field/param initialiser is not a subtype of the field/param type",
                    );
                    return Err(Fatal);
                }
                self.tree.set_ty(node, declared);
                Ok(())
            }

            (Some(declared), false) => {
                self.tree.set_ty(node, declared);
                Ok(())
            }
        }
    }

    fn method_decl(&mut self, node: NodeId) -> Checked {
        let result_node = self.tree.child(node, 4).ok_or(Fatal)?;
        let partial_node = self.tree.child(node, 5).ok_or(Fatal)?;
        let body = self.tree.child(node, 6).ok_or(Fatal)?;

        // abstract members have nothing to check
        if self.tree.kind(body) == NodeKind::None {
            return Ok(());
        }

        let is_trait = self
            .tree
            .enclosing_type(node)
            .is_some_and(|def| self.tree.kind(def) == NodeKind::Trait);

        let body_ty = self.expr_ty(body)?;
        let last = self.tree.last_child(body).unwrap_or(body);

        if body_ty == Type::Error {
            self.error(result_node, "function body always results in an error");
            self.note(last, "function body expression is here");
            return Err(Fatal);
        }

        let partial = self.tree.kind(partial_node) == NodeKind::Question;
        let can_fail = is_subtype(self.defs, &Type::Error, &body_ty);
        let mut ok = true;

        if partial {
            // a partial function must actually be able to fail, except in
            // a trait where the body is only a default
            if !is_trait && !can_fail {
                self.error(partial_node, "function body is not partial but the function is");
                ok = false;
            }
        } else if can_fail {
            self.error(partial_node, "function body is partial but the function is not");
            ok = false;
        }

        if let Some(declared) = self.tree.ty(result_node).cloned() {
            let expected = if partial {
                union_of(self.defs, declared, Type::Error)
            } else {
                declared
            };

            if !is_subtype(self.defs, &body_ty, &expected) {
                self.error(result_node, "function body isn't a subtype of the result type");
                self.note(last, "function body expression is here");
                ok = false;
            }

            // a concrete body may not be strictly more specific than the
            // declared result
            if !is_trait && !is_eqtype(self.defs, &body_ty, &expected) {
                self.error(result_node, "function body is more specific than the result type");
                self.note(last, "function body expression is here");
                ok = false;
            }
        }

        if ok {
            Ok(())
        } else {
            Err(Fatal)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sablec_util::span::Span;

    fn sp() -> Span {
        Span::DUMMY
    }

    fn checker_fixture() -> (SyntaxTree, TypeDefs, Handler) {
        (SyntaxTree::new(), TypeDefs::builtin(), Handler::new())
    }

    #[test]
    fn test_lvalue_classifier() {
        let (mut tree, defs, handler) = checker_fixture();

        let id = tree.leaf(NodeKind::Id(Symbol::intern("x")), sp());
        let reference = tree.node(NodeKind::Reference, sp(), &[id]);
        let lit = tree.leaf(NodeKind::Int(1), sp());
        let good_tuple = tree.node(NodeKind::Tuple, sp(), &[reference]);
        let id2 = tree.leaf(NodeKind::Id(Symbol::intern("y")), sp());
        let reference2 = tree.node(NodeKind::Reference, sp(), &[id2]);
        let bad_tuple = tree.node(NodeKind::Tuple, sp(), &[reference2, lit]);

        let checker = ExprChecker::new(&mut tree, &defs, &handler);
        assert!(checker.is_lvalue(reference));
        assert!(checker.is_lvalue(good_tuple));
        assert!(!checker.is_lvalue(bad_tuple));
        assert!(!checker.is_lvalue(lit));
    }

    #[test]
    fn test_literal_dispatch() {
        let (mut tree, defs, handler) = checker_fixture();
        let int = tree.leaf(NodeKind::Int(42), sp());
        let float = tree.leaf(NodeKind::Float(1.5), sp());
        let string = tree.leaf(NodeKind::Str(Symbol::intern("hi")), sp());

        let mut checker = ExprChecker::new(&mut tree, &defs, &handler);
        assert_eq!(checker.type_expr(int), PassResult::Ok);
        assert_eq!(checker.type_expr(float), PassResult::Ok);
        assert_eq!(checker.type_expr(string), PassResult::Ok);

        assert_eq!(tree.ty(int), Some(&Type::builtin(builtin::INT_LITERAL)));
        assert_eq!(tree.ty(float), Some(&Type::builtin(builtin::FLOAT_LITERAL)));
        assert_eq!(tree.ty(string), Some(&Type::builtin(builtin::STRING)));
        assert!(handler.is_empty());
    }

    #[test]
    fn test_type_for_fun_shape() {
        let (mut tree, defs, handler) = checker_fixture();

        let cap = tree.leaf(NodeKind::Cap(sablec_types::Capability::Ref), sp());
        let id = tree.leaf(NodeKind::Id(Symbol::intern("shove")), sp());
        let tps = tree.leaf(NodeKind::None, sp());
        let p_id = tree.leaf(NodeKind::Id(Symbol::intern("n")), sp());
        let p_ty = tree.leaf(NodeKind::TypeRef, sp());
        tree.set_ty(p_ty, Type::builtin(builtin::INTEGER));
        let p_init = tree.leaf(NodeKind::None, sp());
        let param = tree.node(NodeKind::Param, sp(), &[p_id, p_ty, p_init]);
        let params = tree.node(NodeKind::Params, sp(), &[param]);
        let result = tree.leaf(NodeKind::TypeRef, sp());
        tree.set_ty(result, Type::bool());
        let partial = tree.leaf(NodeKind::Question, sp());
        let body = tree.leaf(NodeKind::None, sp());
        let fun = tree.node(
            NodeKind::Fun,
            sp(),
            &[cap, id, tps, params, result, partial, body],
        );

        let checker = ExprChecker::new(&mut tree, &defs, &handler);
        let ty = checker.type_for_fun(fun).ok().unwrap();

        match ty {
            Type::Method(method) => {
                assert_eq!(method.kind, MethodKind::Fun);
                assert_eq!(method.cap, Some(sablec_types::Capability::Ref));
                assert_eq!(method.params, vec![Type::builtin(builtin::INTEGER)]);
                assert_eq!(method.result, Some(Type::bool()));
                assert!(method.partial);
            }
            other => panic!("expected a method type, got {:?}", other),
        }
    }
}
