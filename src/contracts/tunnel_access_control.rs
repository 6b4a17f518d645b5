// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.
// Generated from ../../../cs/src/Contracts/TunnelAccessControl.cs

use crate::contracts::TunnelAccessControlEntry;
use serde::{Deserialize, Serialize};

// Data contract for access control on a `Tunnel` or `TunnelPort`.
//
// Access control rules for tunnels and ports are defined by an ordered list of access
// control entries (ACEs). Each entry grants or denies one or more access scopes to one
// or more subjects.
#[derive(Clone, Debug, Deserialize, Serialize, Default)]
#[serde(rename_all(serialize = "camelCase", deserialize = "camelCase"))]
pub struct TunnelAccessControl {
    // Gets or sets the list of access control entries.
    //
    // The order of entries is significant: all "allow" entries are processed before any
    // "deny" entries, regardless of their order in the list, so that a deny entry always
    // takes precedence.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub entries: Vec<TunnelAccessControlEntry>,
}
