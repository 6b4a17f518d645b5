// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.
// Generated from ../../../cs/src/Contracts/ErrorCodes.cs

// Error codes for ErrorDetail.Code and `x-ms-error-code` header.

// Operation timed out.
pub const ERROR_CODES_TIMEOUT: &str = r#"Timeout"#;

// Operation cannot be performed because the service is not available.
pub const ERROR_CODES_SERVICE_UNAVAILABLE: &str = r#"ServiceUnavailable"#;

// Internal error.
pub const ERROR_CODES_INTERNAL_ERROR: &str = r#"InternalError"#;
