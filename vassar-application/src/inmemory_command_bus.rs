use crate::{
    command::Command, command_bus::CommandBus, command_handler::CommandHandler,
    context::AppContext, error::AppError,
};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::any::{Any, TypeId, type_name};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::debug;

type BoxAnySend = Box<dyn Any + Send>;

type CmdHandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<BoxAnySend, AppError>> + Send + 'a>>;

type CmdHandlerFn =
    Arc<dyn for<'a> Fn(BoxAnySend, &'a AppContext) -> CmdHandlerFuture<'a> + Send + Sync>;

/// 基于内存的 CommandBus 实现
/// - 通过 TypeId 注册不同 Command 对应的 Handler，每种命令只允许一个处理器
/// - 运行时以类型擦除（Any）方式进行调度，并在调用端还原 `C::Output`
pub struct InMemoryCommandBus {
    handlers: DashMap<TypeId, (&'static str, CmdHandlerFn)>,
}

impl Default for InMemoryCommandBus {
    fn default() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }
}

impl InMemoryCommandBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册命令处理器
    pub fn register<C, H>(&self, handler: Arc<H>) -> Result<(), AppError>
    where
        C: Command,
        H: CommandHandler<C> + 'static,
    {
        let f: CmdHandlerFn = Arc::new(move |boxed_cmd, ctx| {
            let handler = handler.clone();

            Box::pin(async move {
                // 键与闭包共享同一泛型 C，正常情况下 downcast 不会失败
                match boxed_cmd.downcast::<C>() {
                    Ok(cmd) => {
                        let out = handler.handle(ctx, *cmd).await?;
                        Ok(Box::new(out) as BoxAnySend)
                    }
                    Err(_) => Err(AppError::TypeMismatch {
                        expected: C::NAME,
                        found: "unknown",
                    }),
                }
            })
        });

        match self.handlers.entry(TypeId::of::<C>()) {
            Entry::Occupied(_) => Err(AppError::AlreadyRegisteredCommand { command: C::NAME }),
            Entry::Vacant(slot) => {
                slot.insert((C::NAME, f));
                Ok(())
            }
        }
    }

    /// 已注册的命令名列表
    pub fn registered_commands(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|e| e.value().0).collect()
    }
}

#[async_trait]
impl CommandBus for InMemoryCommandBus {
    async fn dispatch<C: Command>(&self, ctx: &AppContext, cmd: C) -> Result<C::Output, AppError> {
        let Some(f) = self.handlers.get(&TypeId::of::<C>()).map(|h| h.1.clone()) else {
            return Err(AppError::HandlerNotFound(C::NAME));
        };
        debug!(command = C::NAME, correlation_id = ?ctx.correlation_id, "dispatching command");

        let out = (f)(Box::new(cmd), ctx).await?;

        match out.downcast::<C::Output>() {
            Ok(out) => Ok(*out),
            Err(_) => Err(AppError::TypeMismatch {
                expected: type_name::<C::Output>(),
                found: "unknown",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::task::JoinSet;

    struct Bump(usize);

    impl Command for Bump {
        const NAME: &'static str = "Bump";
        type Output = usize;
    }

    struct BumpHandler {
        total: AtomicUsize,
    }

    #[async_trait]
    impl CommandHandler<Bump> for BumpHandler {
        async fn handle(&self, _ctx: &AppContext, cmd: Bump) -> Result<usize, AppError> {
            Ok(self.total.fetch_add(cmd.0, Ordering::SeqCst) + cmd.0)
        }
    }

    fn handler() -> Arc<BumpHandler> {
        Arc::new(BumpHandler {
            total: AtomicUsize::new(0),
        })
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn register_and_dispatch_returns_output() {
        let bus = InMemoryCommandBus::new();
        bus.register::<Bump, _>(handler()).unwrap();

        let ctx = AppContext::default();
        assert_eq!(bus.dispatch(&ctx, Bump(3)).await.unwrap(), 3);
        assert_eq!(bus.dispatch(&ctx, Bump(4)).await.unwrap(), 7);
        assert_eq!(bus.registered_commands(), vec!["Bump"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn duplicate_registration_is_rejected() {
        let bus = InMemoryCommandBus::new();
        bus.register::<Bump, _>(handler()).unwrap();
        match bus.register::<Bump, _>(handler()).unwrap_err() {
            AppError::AlreadyRegisteredCommand { command } => assert_eq!(command, "Bump"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn not_found_error_when_unregistered() {
        let bus = InMemoryCommandBus::new();
        let err = bus
            .dispatch(&AppContext::default(), Bump(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::HandlerNotFound("Bump")));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_dispatch_is_safe() {
        let bus = Arc::new(InMemoryCommandBus::new());
        bus.register::<Bump, _>(handler()).unwrap();

        let mut set = JoinSet::new();
        for _ in 0..50 {
            let bus = bus.clone();
            set.spawn(async move { bus.dispatch(&AppContext::default(), Bump(1)).await.unwrap() });
        }
        let mut seen = Vec::new();
        while let Some(res) = set.join_next().await {
            seen.push(res.unwrap());
        }
        seen.sort_unstable();
        assert_eq!(seen, (1..=50).collect::<Vec<_>>());
    }
}
