// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.
// Generated from ../../../cs/src/Contracts/TunnelAuthenticationSchemes.cs

// Defines string constants for authentication schemes supported by tunnel service APIs.

// Authentication scheme for AAD (or Microsoft account) access tokens.
const AAD: &str = "aad";

// Authentication scheme for GitHub access tokens.
const GITHUB: &str = "github";

// Authentication scheme for tunnel access tokens.
const TUNNEL: &str = "tunnel";
