use bon::Builder;

/// 应用层上下文（Application Context）
///
/// 承载一次应用层调用（命令/查询）所需的横切信息：
/// - 关联追踪 `correlation_id`，通常来自请求头；
/// - 执行者 `actor_id`；
/// - 幂等键 `idempotency_key`：由接口层透传，为空则不参与幂等。
///
/// 典型用法：
/// ```rust
/// use vassar_application::context::AppContext;
///
/// let ctx = AppContext::builder()
///     .correlation_id("cor-123")
///     .actor_id("seed")
///     .build();
/// assert_eq!(ctx.correlation_id.as_deref(), Some("cor-123"));
/// assert!(ctx.idempotency_key.is_none());
/// ```
#[derive(Clone, Debug, Default, Builder)]
pub struct AppContext {
    #[builder(into)]
    pub correlation_id: Option<String>,
    #[builder(into)]
    pub actor_id: Option<String>,
    #[builder(into)]
    pub idempotency_key: Option<String>,
}
