/// 应用层命令（Command）
///
/// 表达"意图"的写操作请求，会修改登记状态。
/// - 与 [`Query`](crate::query::Query) 相对，`Command` 应避免读写混用；
/// - 命名保持"动宾结构"，如 `LoadPerson`、`RelatePeople`。
///
/// 关联常量：
/// - `NAME`：命令的稳定名称，用于日志、追踪与路由。避免依赖 `type_name::<T>()`。
pub trait Command: Send + Sync + 'static {
    /// 命令的稳定名称（建议常量字符串，不随重构变化）
    const NAME: &'static str;

    /// 执行结果；只返回写入后的必要回显（如新分配的标识），不承载查询语义
    type Output: Send + 'static;
}
