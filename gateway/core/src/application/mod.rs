// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod device_communication;
pub mod dispatcher;
pub mod gateway;
pub mod inventory;
pub mod session_broker;

pub use device_communication::{DeviceCommunicationService, DeviceResponse, ResourceInfoRequest};
pub use dispatcher::PluginDispatcher;
pub use gateway::PluginGateway;
pub use inventory::InventoryService;
pub use session_broker::SessionBroker;
