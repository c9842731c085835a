// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Name resolution over parse trees.

mod scope;

pub use scope::{
    build_file_scope, FileScope, Scope, ScopeId, ScopeItem, ScopeOpener, TokenId, VarId, Variable,
    VariableKind,
};
