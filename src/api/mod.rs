// 服务端接口模块

pub mod client;
pub mod models;

pub use client::{AuthClient, AuthGateway};
pub use models::{LoginForm, LoginResponse, LoginUser, LogoutResponse};
