// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.
// Generated from ../../../cs/src/Contracts/TunnelProtocol.cs

// Defines possible values for the protocol of a `TunnelPort`.

// The protocol is automatically detected. (TODO: Define detection semantics.)
const AUTO: &str = "auto";

// Unknown TCP protocol.
const TCP: &str = "tcp";

// Unknown UDP protocol.
const UDP: &str = "udp";

// SSH protocol.
const SSH: &str = "ssh";

// Remote desktop protocol.
const RDP: &str = "rdp";

// HTTP protocol.
const HTTP: &str = "http";

// HTTPS protocol.
const HTTPS: &str = "https";
