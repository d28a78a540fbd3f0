//! Tolerant Puppet parser.
//!
//! Only declarations get real structure. Everything else is walked by
//! [`Parser::fast_forward`], which records a blob for the scanned region and
//! picks out the pieces an editor cares about (variables, strings, calls,
//! resources, nested declarations) as the blob's children.

pub mod stream;

use bumpalo::Bump;
use tracing::{debug, info, trace};

use crate::ast::{CaseArm, NodeData, NodeId, Tree};
use crate::cancel::CancellationToken;
use crate::error::Interrupted;
use crate::lexer::token::{Token, TokenKind};
use stream::{TokenSource, TokenStream};

/// Type recorded for a parameter declared without one.
pub const ANY_TYPE: &str = "Any";

/// Result of one parse. `status` is an error when the parse stopped early; the
/// tree then covers only the statements read so far.
#[derive(Debug)]
pub struct Manifest<'ast> {
    pub tree: Tree<'ast>,
    pub status: Result<(), Interrupted>,
}

impl Manifest<'_> {
    pub fn is_partial(&self) -> bool {
        self.status.is_err()
    }
}

/// Parses a whole snapshot in one go.
pub fn parse_str<'ast>(source: &str, arena: &'ast Bump) -> Manifest<'ast> {
    Parser::new(TokenStream::new(source), arena).parse_manifest()
}

#[derive(Debug, Default, Clone, Copy)]
struct Depth {
    brace: u32,
    bracket: u32,
    paren: u32,
}

impl Depth {
    fn is_top(&self) -> bool {
        self.brace == 0 && self.bracket == 0 && self.paren == 0
    }

    /// Closers without a matching opener leave their counter at zero.
    fn track(&mut self, kind: TokenKind) {
        match kind {
            TokenKind::LBrace => self.brace += 1,
            TokenKind::RBrace => self.brace = self.brace.saturating_sub(1),
            TokenKind::LBracket => self.bracket += 1,
            TokenKind::RBracket => self.bracket = self.bracket.saturating_sub(1),
            TokenKind::LParen => self.paren += 1,
            TokenKind::RParen => self.paren = self.paren.saturating_sub(1),
            _ => {}
        }
    }
}

/// How far [`Parser::parse_resource`] got.
enum ResourceOutcome {
    /// The body was read through its closing brace.
    Complete,
    /// The opening brace was consumed but the body was not; the cursor is on the
    /// first token the resource could not use.
    Abandoned,
}

pub struct Parser<'src, 'ast, S: TokenSource<'src>> {
    tokens: S,
    source: &'src str,
    arena: &'ast Bump,
    tree: Tree<'ast>,
    cancel: CancellationToken,
}

impl<'src, 'ast, S: TokenSource<'src>> Parser<'src, 'ast, S> {
    pub fn new(tokens: S, arena: &'ast Bump) -> Self {
        Self::with_cancellation(tokens, arena, CancellationToken::default())
    }

    pub fn with_cancellation(tokens: S, arena: &'ast Bump, cancel: CancellationToken) -> Self {
        let source = tokens.source();
        Self {
            tokens,
            source,
            arena,
            tree: Tree::new(source.len()),
            cancel,
        }
    }

    pub fn parse_manifest(mut self) -> Manifest<'ast> {
        self.tokens.move_start();
        let root = self.tree.root();
        let mut token = self.next_skip_trivia();
        let status = loop {
            if self.cancel.is_cancelled() {
                info!(offset = self.tokens.offset(), "parse cancelled");
                break Err(Interrupted::Cancelled);
            }
            if !self.tokens.is_valid() {
                info!(offset = self.tokens.offset(), "source changed, abandoning parse");
                break Err(Interrupted::SourceChanged);
            }
            let Some(current) = token else {
                break Ok(());
            };
            // Other top-level statements are not modelled yet.
            match current.kind {
                TokenKind::Class => self.parse_class(root),
                TokenKind::Node => self.parse_node(root),
                TokenKind::Define => self.parse_define(root),
                _ => {}
            }
            token = self.next_skip_trivia();
        };
        self.tree.seal();
        Manifest { tree: self.tree, status }
    }

    // Cursor helpers

    fn skip_trivia(&mut self) -> Option<Token> {
        loop {
            let token = self.tokens.token()?;
            if !token.is_trivia() {
                return Some(token);
            }
            if !self.tokens.move_next() {
                return None;
            }
        }
    }

    fn next_skip_trivia(&mut self) -> Option<Token> {
        if !self.tokens.move_next() {
            return None;
        }
        self.skip_trivia()
    }

    /// Un-peeks: steps back to the previous non-trivia token.
    fn prev_skip_trivia(&mut self) -> Option<Token> {
        loop {
            if !self.tokens.move_previous() {
                return None;
            }
            let token = self.tokens.token()?;
            if !token.is_trivia() {
                return Some(token);
            }
        }
    }

    fn rewind_to(&mut self, offset: usize) {
        while self.tokens.offset() > offset && self.tokens.move_previous() {}
    }

    fn text(&self, token: &Token) -> &'src str {
        token.text.unwrap_or_else(|| token.span.as_str(self.source))
    }

    fn alloc(&self, text: &str) -> &'ast str {
        self.arena.alloc_str(text)
    }

    fn is_kind(token: Option<Token>, kind: TokenKind) -> bool {
        token.is_some_and(|t| t.kind == kind)
    }

    // Leaf nodes

    fn add_identifier(&mut self, parent: NodeId, start: usize, name: &str) -> NodeId {
        let name = self.alloc(name);
        self.tree.add(parent, start, start + name.len(), NodeData::Identifier { name })
    }

    fn add_variable(&mut self, parent: NodeId, token: Token, definition: bool) -> NodeId {
        let name = self.alloc(self.text(&token));
        let data = if definition {
            NodeData::VariableDefinition { name }
        } else {
            NodeData::Variable { name }
        };
        self.tree.add(parent, token.span.start, token.span.end, data)
    }

    /// A class reference named by an identifier or a quoted string.
    fn add_class_ref(&mut self, parent: NodeId, token: Token) -> NodeId {
        let text = self.text(&token);
        let (start, name) = match unquote(text) {
            Some(inner) => (token.span.start + 1, inner),
            None => (token.span.start, text),
        };
        let class_ref = self.tree.add(parent, token.span.start, token.span.end, NodeData::ClassRef { name: None });
        let ident = self.add_identifier(class_ref, start, name);
        *self.tree.data_mut(class_ref) = NodeData::ClassRef { name: Some(ident) };
        class_ref
    }

    /// String literal with its `${name}` interpolations as variable children.
    fn add_string(&mut self, parent: NodeId, token: Token) -> NodeId {
        let text = self.text(&token);
        let value = unquote(text).unwrap_or(text);
        let string = self.tree.add(
            parent,
            token.span.start,
            token.span.end,
            NodeData::StringLiteral { value: self.alloc(value) },
        );
        if text.starts_with('"') && value.len() < text.len() {
            let value_start = token.span.start + 1;
            for (at, len) in interpolations(value) {
                let name = self.alloc(&format!("${}", &value[at + 2..at + len - 1]));
                let start = value_start + at;
                self.tree.add(string, start, start + len, NodeData::Variable { name });
            }
        }
        string
    }

    // Declarations

    fn parse_class(&mut self, parent: NodeId) {
        let offset = self.tokens.offset();
        match self.next_skip_trivia() {
            Some(name) if name.kind == TokenKind::Identifier => {
                let class = self.tree.add(
                    parent,
                    offset,
                    offset,
                    NodeData::ClassDecl { name: None, inherits: None, body: None },
                );
                self.parse_class_internal(class, name);
            }
            _ => debug!(offset, "class keyword without a name"),
        }
    }

    /// Everything after `class`, with the cursor on the name.
    fn parse_class_internal(&mut self, class: NodeId, name: Token) {
        trace!(offset = name.span.start, name = self.text(&name), "class");
        let name_id = self.add_identifier(class, name.span.start, self.text(&name));
        let mut inherits = None;
        let mut body = None;

        let mut token = self.next_skip_trivia();
        if Self::is_kind(token, TokenKind::LParen) {
            self.parse_params(class);
            token = self.next_skip_trivia();
        }
        if Self::is_kind(token, TokenKind::Inherits) {
            token = self.next_skip_trivia();
            if let Some(parent_class) = token.filter(|t| t.kind == TokenKind::Identifier) {
                inherits = Some(self.add_class_ref(class, parent_class));
                token = self.next_skip_trivia();
            }
        }
        if Self::is_kind(token, TokenKind::LBrace) {
            self.tokens.move_next();
            body = Some(self.fast_forward(class, &[TokenKind::RBrace]));
        } else {
            debug!(offset = self.tokens.offset(), "class without a body");
            self.prev_skip_trivia();
        }
        *self.tree.data_mut(class) = NodeData::ClassDecl { name: Some(name_id), inherits, body };
    }

    fn parse_define(&mut self, parent: NodeId) {
        let offset = self.tokens.offset();
        let define = self.tree.add(parent, offset, offset, NodeData::DefineDecl { name: "", body: None });
        if self.next_skip_trivia().is_none() {
            return;
        }
        let Some(name) = self.collect_text(&[TokenKind::Whitespace, TokenKind::LBrace, TokenKind::LParen]) else {
            return;
        };
        trace!(offset, name, "define");
        let name = self.alloc(name);
        let mut body = None;

        let mut token = self.skip_trivia();
        if Self::is_kind(token, TokenKind::LParen) {
            self.parse_params(define);
            token = self.next_skip_trivia();
        }
        if Self::is_kind(token, TokenKind::LBrace) {
            self.tokens.move_next();
            body = Some(self.fast_forward(define, &[TokenKind::RBrace]));
        } else {
            debug!(offset = self.tokens.offset(), "define without a body");
            self.prev_skip_trivia();
        }
        *self.tree.data_mut(define) = NodeData::DefineDecl { name, body };
    }

    /// Source text from the current token up to the first stop kind. `None` at end of input.
    fn collect_text(&mut self, stops: &[TokenKind]) -> Option<&'src str> {
        let start = self.tokens.offset();
        loop {
            let token = self.tokens.token()?;
            if stops.contains(&token.kind) {
                return Some(&self.source[start..token.span.start]);
            }
            if !self.tokens.move_next() {
                return None;
            }
        }
    }

    fn parse_node(&mut self, parent: NodeId) {
        let offset = self.tokens.offset();
        trace!(offset, "node");
        let node = self.tree.add(parent, offset, offset, NodeData::NodeDecl { names: &[], body: None });
        let mut names = Vec::new();
        let mut token = self.next_skip_trivia();
        while let Some(current) = token
            && current.kind != TokenKind::LBrace
        {
            if current.kind != TokenKind::Comma {
                names.push(self.alloc(self.text(&current)));
            }
            token = self.next_skip_trivia();
        }
        let mut body = None;
        if token.is_some() {
            self.tokens.move_next();
            body = Some(self.fast_forward(node, &[TokenKind::RBrace]));
        } else {
            debug!(offset, "node without a body");
        }
        let names = self.arena.alloc_slice_copy(&names);
        *self.tree.data_mut(node) = NodeData::NodeDecl { names, body };
    }

    /// `[Type] $name [= default], ...` with the cursor on `(`. Leaves the cursor on `)`.
    fn parse_params(&mut self, container: NodeId) {
        let mut type_name: Option<(&'src str, usize)> = None;
        let mut param: Option<NodeId> = None;
        let mut brackets = 0;
        let mut token = self.next_skip_trivia();
        while let Some(current) = token
            && current.kind != TokenKind::RParen
        {
            match current.kind {
                TokenKind::Identifier if type_name.is_none() && param.is_none() => {
                    type_name = Some((self.text(&current), current.span.start));
                }
                TokenKind::LBracket => brackets += 1,
                TokenKind::RBracket => brackets -= 1,
                TokenKind::Variable if param.is_none() => {
                    let (ty, start) = type_name.unwrap_or((ANY_TYPE, current.span.start));
                    let id = self.tree.add(
                        container,
                        start,
                        start,
                        NodeData::ClassParam { type_name: self.alloc(ty), variable: None, default: None },
                    );
                    let variable = self.add_variable(id, current, true);
                    if let NodeData::ClassParam { variable: slot, .. } = self.tree.data_mut(id) {
                        *slot = Some(variable);
                    }
                    param = Some(id);
                }
                TokenKind::Equals => {
                    self.next_skip_trivia();
                    let owner = param.unwrap_or(container);
                    let default = self.fast_forward(owner, &[TokenKind::RParen, TokenKind::Comma]);
                    match param {
                        Some(p) => {
                            if let NodeData::ClassParam { default: slot, .. } = self.tree.data_mut(p) {
                                *slot = Some(default);
                            }
                        }
                        None => debug!(offset = current.span.start, "parameter default without a variable"),
                    }
                    token = self.tokens.token();
                    if token.is_some_and(|t| t.kind == TokenKind::Comma) {
                        param = None;
                        type_name = None;
                        token = self.next_skip_trivia();
                    }
                    continue;
                }
                TokenKind::Comma if brackets == 0 => {
                    param = None;
                    type_name = None;
                }
                _ => {}
            }
            token = self.next_skip_trivia();
        }
    }

    // Fast-forward

    /// Scans from the current token to the first stop kind at nesting depth zero,
    /// collecting what it recognizes into a new blob under `parent`.
    ///
    /// The cursor is left on the stop token, which the blob's span includes.
    fn fast_forward(&mut self, parent: NodeId, stops: &[TokenKind]) -> NodeId {
        let start = self.tokens.offset();
        let blob = self.tree.add(parent, start, start, NodeData::Blob);
        self.fast_forward_into(blob, stops);
        blob
    }

    fn fast_forward_into(&mut self, blob: NodeId, stops: &[TokenKind]) {
        let mut depth = Depth::default();
        let mut token = self.skip_trivia();
        while let Some(current) = token {
            if depth.is_top() && stops.contains(&current.kind) {
                break;
            }
            depth.track(current.kind);
            match current.kind {
                TokenKind::StringLiteral => {
                    self.add_string(blob, current);
                }
                TokenKind::Variable => {
                    let next = self.next_skip_trivia();
                    if Self::is_kind(next, TokenKind::Equals) {
                        self.add_variable(blob, current, true);
                    } else {
                        self.add_variable(blob, current, false);
                        token = next;
                        continue;
                    }
                }
                TokenKind::Include | TokenKind::Require | TokenKind::Contain => {
                    token = self.include_like(blob, current, &mut depth);
                    continue;
                }
                TokenKind::Identifier | TokenKind::Class => {
                    if let Some(next) = self.identifier_led(blob, current, &mut depth) {
                        token = next;
                        continue;
                    }
                }
                TokenKind::Case => self.parse_case(blob),
                TokenKind::If => self.parse_if(blob, false),
                TokenKind::Unless => self.parse_if(blob, true),
                TokenKind::Dot => {
                    self.tokens.move_next();
                    match self.tokens.token() {
                        Some(method) if method.kind == TokenKind::Identifier || method.kind.is_function() => {
                            self.call(blob, method);
                        }
                        other => {
                            token = other;
                            continue;
                        }
                    }
                }
                kind if kind.is_function() => {
                    self.call(blob, current);
                }
                _ => {}
            }
            token = self.next_skip_trivia();
        }
        let end = token.map_or(self.source.len(), |t| t.span.end);
        self.tree.set_end(blob, end);
    }

    /// A named call. With `(` the arguments become a blob, without it the call
    /// is just the name and the cursor stays on it.
    fn call(&mut self, parent: NodeId, name: Token) -> NodeId {
        let call = self.tree.add(
            parent,
            name.span.start,
            name.span.end,
            NodeData::FunctionCall { name: self.alloc(self.text(&name)) },
        );
        if Self::is_kind(self.next_skip_trivia(), TokenKind::LParen) {
            self.tokens.move_next();
            self.fast_forward(call, &[TokenKind::RParen]);
        } else {
            self.prev_skip_trivia();
        }
        call
    }

    /// `include`/`require`/`contain` with the cursor on the keyword. Returns the
    /// next token the enclosing scan has to look at.
    fn include_like(&mut self, blob: NodeId, keyword: Token, depth: &mut Depth) -> Option<Token> {
        let Some(next) = self.next_skip_trivia() else {
            self.new_call(blob, keyword);
            return None;
        };
        match next.kind {
            TokenKind::LParen => {
                self.prev_skip_trivia();
                self.call(blob, keyword);
                self.next_skip_trivia()
            }
            TokenKind::Identifier | TokenKind::StringLiteral => {
                let call = self.new_call(blob, keyword);
                self.parse_req_list(call);
                self.tokens.token()
            }
            TokenKind::LBracket => {
                depth.bracket += 1;
                let call = self.new_call(blob, keyword);
                self.next_skip_trivia();
                self.parse_req_list(call);
                self.tokens.token()
            }
            _ => {
                self.new_call(blob, keyword);
                Some(next)
            }
        }
    }

    fn new_call(&mut self, parent: NodeId, name: Token) -> NodeId {
        let data = NodeData::FunctionCall { name: self.alloc(self.text(&name)) };
        self.tree.add(parent, name.span.start, name.span.end, data)
    }

    /// Comma-separated class names, bare, quoted or `Class['name']`. A malformed
    /// `Class[...]` abandons the rest of the list.
    fn parse_req_list(&mut self, call: NodeId) {
        let mut token = self.tokens.token();
        while let Some(current) = token
            && matches!(current.kind, TokenKind::Identifier | TokenKind::StringLiteral)
        {
            if current.kind == TokenKind::Identifier && self.text(&current) == "Class" {
                if self.parse_class_reference(call).is_none() {
                    debug!(offset = current.span.start, "malformed class reference, abandoning list");
                    return;
                }
            } else {
                self.add_class_ref(call, current);
            }
            token = self.next_skip_trivia();
            if !Self::is_kind(token, TokenKind::Comma) {
                return;
            }
            token = self.next_skip_trivia();
        }
    }

    /// `Class['name']` with the cursor on `Class`. `None` when malformed; nothing
    /// is added and the cursor is back on `Class`.
    fn parse_class_reference(&mut self, parent: NodeId) -> Option<NodeId> {
        let start = self.tokens.offset();
        let Some((name, close)) = self.class_reference_parts() else {
            self.rewind_to(start);
            return None;
        };
        let text = self.text(&name);
        let (name_start, inner) = match unquote(text) {
            Some(inner) => (name.span.start + 1, inner),
            None => (name.span.start, text),
        };
        let class_ref = self.tree.add(parent, start, close.span.end, NodeData::ClassRef { name: None });
        let ident = self.add_identifier(class_ref, name_start, inner);
        *self.tree.data_mut(class_ref) = NodeData::ClassRef { name: Some(ident) };
        Some(class_ref)
    }

    fn class_reference_parts(&mut self) -> Option<(Token, Token)> {
        self.next_skip_trivia().filter(|t| t.kind == TokenKind::LBracket)?;
        let name = self.next_skip_trivia().filter(|t| t.kind == TokenKind::StringLiteral)?;
        let close = self.next_skip_trivia().filter(|t| t.kind == TokenKind::RBracket)?;
        Some((name, close))
    }

    /// Identifier or `class` inside a scan. Returns the token the scan has to
    /// look at next, or `None` to continue after the current one.
    fn identifier_led(&mut self, blob: NodeId, current: Token, depth: &mut Depth) -> Option<Option<Token>> {
        let name = self.text(&current);
        if current.kind == TokenKind::Identifier {
            if name == "Class" {
                // A malformed reference leaves the cursor on `Class`; the scan
                // then counts its brackets like any others.
                self.parse_class_reference(blob);
                return None;
            }
            let next = self.next_skip_trivia();
            if Self::is_kind(next, TokenKind::LParen) {
                self.prev_skip_trivia();
                self.call(blob, current);
                return None;
            }
            if Self::is_kind(next, TokenKind::LBracket) && is_capitalized(name) {
                self.tokens.move_next();
                let reference = self.tree.add(
                    blob,
                    current.span.start,
                    current.span.end,
                    NodeData::TypeReference { name: self.alloc(name) },
                );
                self.fast_forward(reference, &[TokenKind::RBracket]);
                return None;
            }
            self.prev_skip_trivia();
        }
        if depth.bracket != 0 || depth.paren != 0 {
            return None;
        }

        let next = self.next_skip_trivia();
        match next {
            Some(brace) if brace.kind == TokenKind::LBrace => {
                let resource_type = if current.kind == TokenKind::Class { "class" } else { name };
                match self.parse_resource(blob, resource_type, current.span.start) {
                    ResourceOutcome::Complete => None,
                    ResourceOutcome::Abandoned => {
                        depth.brace += 1;
                        Some(self.tokens.token())
                    }
                }
            }
            Some(class_name) if class_name.kind == TokenKind::Identifier && current.kind == TokenKind::Class => {
                let offset = current.span.start;
                let class = self.tree.add(
                    blob,
                    offset,
                    offset,
                    NodeData::ClassDecl { name: None, inherits: None, body: None },
                );
                self.parse_class_internal(class, class_name);
                None
            }
            _ => Some(next),
        }
    }

    // Resources

    /// Resource body with the cursor on `{`. A lowercase type needs `title:`
    /// first; a capitalized one sets defaults and goes straight to attributes.
    fn parse_resource(&mut self, parent: NodeId, resource_type: &str, offset: usize) -> ResourceOutcome {
        trace!(offset, resource_type, "resource");
        let resource_type = self.alloc(resource_type);
        if is_capitalized(resource_type) {
            let resource = self.tree.add(parent, offset, offset, NodeData::Resource { resource_type, title: None });
            self.parse_resource_attrs(resource);
            return ResourceOutcome::Complete;
        }

        let Some(token) = self.next_skip_trivia() else {
            return ResourceOutcome::Abandoned;
        };
        let title = match token.kind {
            TokenKind::StringLiteral if resource_type == "class" => self.add_class_ref(parent, token),
            TokenKind::StringLiteral => self.add_string(parent, token),
            TokenKind::Variable => self.add_variable(parent, token, false),
            TokenKind::Identifier => self.tree.add(
                parent,
                token.span.start,
                token.span.end,
                NodeData::StringLiteral { value: self.alloc(self.text(&token)) },
            ),
            TokenKind::LBracket => {
                let titles = self.tree.add(parent, token.span.start, token.span.start, NodeData::Blob);
                self.tokens.move_next();
                self.fast_forward_into(titles, &[TokenKind::RBracket]);
                titles
            }
            _ => {
                debug!(offset = token.span.start, "resource without a title, abandoning");
                return ResourceOutcome::Abandoned;
            }
        };
        if !Self::is_kind(self.next_skip_trivia(), TokenKind::Colon) {
            debug!(offset = self.tokens.offset(), "resource title without a colon, abandoning");
            return ResourceOutcome::Abandoned;
        }
        let resource = self.tree.add(
            parent,
            offset,
            offset,
            NodeData::Resource { resource_type, title: Some(title) },
        );
        self.tree.reparent(title, resource);
        self.parse_resource_attrs(resource);
        ResourceOutcome::Complete
    }

    /// `name => value` pairs up to the closing `}`, where the cursor is left.
    fn parse_resource_attrs(&mut self, resource: NodeId) {
        let mut attribute: Option<NodeId> = None;
        let mut token = self.next_skip_trivia();
        while let Some(current) = token
            && current.kind != TokenKind::RBrace
        {
            match current.kind {
                TokenKind::Identifier | TokenKind::Unless if attribute.is_none() => {
                    let name = self.alloc(self.text(&current));
                    attribute = Some(self.tree.add(
                        resource,
                        current.span.start,
                        current.span.end,
                        NodeData::ResourceAttribute { name, value: None },
                    ));
                }
                TokenKind::FatArrow => {
                    self.next_skip_trivia();
                    let owner = attribute.unwrap_or(resource);
                    let value = self.fast_forward(owner, &[TokenKind::Comma, TokenKind::RBrace]);
                    if let Some(a) = attribute
                        && let NodeData::ResourceAttribute { value: slot, .. } = self.tree.data_mut(a)
                    {
                        *slot = Some(value);
                    }
                    token = self.tokens.token();
                    continue;
                }
                TokenKind::Comma => attribute = None,
                _ => {}
            }
            token = self.next_skip_trivia();
        }
        if let Some(close) = token {
            self.tree.set_end(resource, close.span.end);
        }
    }

    // Control flow

    /// `case <control> { <matcher>: { <body> } ... }` with the cursor on `case`.
    fn parse_case(&mut self, parent: NodeId) {
        let offset = self.tokens.offset();
        let case = self.tree.add(parent, offset, offset, NodeData::CaseStmt { control: None, arms: Vec::new() });
        self.next_skip_trivia();
        let control = self.fast_forward(case, &[TokenKind::LBrace]);
        let mut arms = Vec::new();

        let mut token = self.tokens.token().and_then(|_| self.next_skip_trivia());
        while let Some(current) = token
            && current.kind != TokenKind::RBrace
        {
            let matcher = self.fast_forward(case, &[TokenKind::Colon]);
            if Self::is_kind(self.next_skip_trivia(), TokenKind::LBrace) {
                self.next_skip_trivia();
                let body = self.fast_forward(case, &[TokenKind::RBrace]);
                arms.push(CaseArm { matcher, body });
            } else {
                debug!(offset = current.span.start, "case arm without a body");
            }
            token = self.next_skip_trivia();
        }
        if let Some(close) = token {
            self.tree.set_end(case, close.span.end);
        }
        *self.tree.data_mut(case) = NodeData::CaseStmt { control: Some(control), arms };
    }

    /// `if`, or `unless` when `negated`, with the cursor on the keyword. An
    /// `elsif` nests a new condition as the previous one's `otherwise`; `unless`
    /// takes none. Leaves the cursor on the last `}` that belongs to the statement.
    fn parse_if(&mut self, parent: NodeId, negated: bool) {
        let offset = self.tokens.offset();
        let mut current = self.tree.add(
            parent,
            offset,
            offset,
            NodeData::Condition { negated, condition: None, consequence: None, otherwise: None },
        );
        self.parse_condition_branches(current);

        let mut token = self.next_skip_trivia();
        while let Some(keyword) = token {
            match keyword.kind {
                TokenKind::Elsif if !negated => {
                    let nested = self.tree.add(
                        current,
                        keyword.span.start,
                        keyword.span.start,
                        NodeData::Condition { negated: false, condition: None, consequence: None, otherwise: None },
                    );
                    self.set_otherwise(current, nested);
                    self.parse_condition_branches(nested);
                    current = nested;
                    token = self.next_skip_trivia();
                }
                TokenKind::Else => {
                    if !Self::is_kind(self.next_skip_trivia(), TokenKind::LBrace) {
                        debug!(offset = keyword.span.start, "else without a body");
                        self.prev_skip_trivia();
                        return;
                    }
                    self.next_skip_trivia();
                    let otherwise = self.fast_forward(current, &[TokenKind::RBrace]);
                    self.set_otherwise(current, otherwise);
                    return;
                }
                _ => break,
            }
        }
        self.prev_skip_trivia();
    }

    /// `<condition> { <consequence> }` with the cursor on the introducing keyword.
    fn parse_condition_branches(&mut self, node: NodeId) {
        self.next_skip_trivia();
        let condition = self.fast_forward(node, &[TokenKind::LBrace]);
        self.next_skip_trivia();
        let consequence = self.fast_forward(node, &[TokenKind::RBrace]);
        if let NodeData::Condition { condition: c, consequence: k, .. } = self.tree.data_mut(node) {
            *c = Some(condition);
            *k = Some(consequence);
        }
    }

    fn set_otherwise(&mut self, node: NodeId, branch: NodeId) {
        if let NodeData::Condition { otherwise, .. } = self.tree.data_mut(node) {
            *otherwise = Some(branch);
        }
    }
}

fn is_capitalized(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Text between matching quotes, if `text` is a closed quoted literal.
fn unquote(text: &str) -> Option<&str> {
    let quote = text.chars().next().filter(|c| matches!(c, '\'' | '"'))?;
    if text.len() >= 2 && text.ends_with(quote) {
        Some(&text[1..text.len() - 1])
    } else {
        None
    }
}

/// `(offset, length)` of each `${name}` in `value`, where the name is made of
/// ASCII letters, `_` and `:`.
fn interpolations(value: &str) -> Vec<(usize, usize)> {
    let bytes = value.as_bytes();
    memchr::memmem::find_iter(bytes, b"${")
        .filter_map(|at| {
            let name_len = bytes[at + 2..]
                .iter()
                .take_while(|b| b.is_ascii_alphabetic() || **b == b'_' || **b == b':')
                .count();
            let close = at + 2 + name_len;
            (name_len > 0 && bytes.get(close) == Some(&b'}')).then_some((at, name_len + 3))
        })
        .collect()
}
