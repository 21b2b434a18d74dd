// API 数据传输对象模块
// 包含与服务端登录/登出接口交互的数据结构

pub mod auth;

// 重新导出常用类型
pub use auth::*;
