// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.
// Generated from RustContractWriter.cs

mod tunnel_environments;
mod tunnel_status;
mod tunnel_service_properties;
mod tunnel_relay_tunnel_endpoint;
mod tunnel_protocol;
mod tunnel_port_status;
mod tunnel_port;
mod tunnel_options;
mod tunnel_header_names;
mod tunnel_endpoint;
mod tunnel_constraints;
mod tunnel_connection_mode;
mod tunnel_authentication_schemes;
mod tunnel_access_subject;
mod tunnel_access_scopes;
mod tunnel_access_control_entry_type;
mod tunnel_access_control_entry;
mod tunnel_access_control;
mod tunnel;
mod service_version_details;
mod resource_status;
mod rate_status;
mod named_rate_status;
mod problem_details;
mod error_detail;
mod inner_error_detail;
mod error_codes;
mod cluster_details;
mod tunnel_list_by_region;
mod tunnel_list_by_region_response;
mod tunnel_port_list_response;
mod tunnel_event;
mod tunnel_progress;
mod tunnel_report_progress_event_args;
mod tunnel_ssh_key_response;
mod local_network_tunnel_endpoint;
mod live_share_relay_tunnel_endpoint;
mod serialization;

pub use tunnel_environments::*;
pub use tunnel_status::*;
pub use tunnel_service_properties::*;
pub use tunnel_relay_tunnel_endpoint::*;
pub use tunnel_protocol::*;
pub use tunnel_port_status::*;
pub use tunnel_port::*;
pub use tunnel_options::*;
pub use tunnel_header_names::*;
pub use tunnel_endpoint::*;
pub use tunnel_constraints::*;
pub use tunnel_connection_mode::*;
pub use tunnel_authentication_schemes::*;
pub use tunnel_access_subject::*;
pub use tunnel_access_scopes::*;
pub use tunnel_access_control_entry_type::*;
pub use tunnel_access_control_entry::*;
pub use tunnel_access_control::*;
pub use tunnel::*;
pub use service_version_details::*;
pub use resource_status::*;
pub use rate_status::*;
pub use named_rate_status::*;
pub use problem_details::*;
pub use error_detail::*;
pub use inner_error_detail::*;
pub use error_codes::*;
pub use cluster_details::*;
pub use tunnel_list_by_region::*;
pub use tunnel_list_by_region_response::*;
pub use tunnel_port_list_response::*;
pub use tunnel_event::*;
pub use tunnel_progress::*;
pub use tunnel_report_progress_event_args::*;
pub use tunnel_ssh_key_response::*;
pub use local_network_tunnel_endpoint::*;
pub use live_share_relay_tunnel_endpoint::*;
