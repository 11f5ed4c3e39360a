use color_eyre::eyre::Result;
use petal::prelude::*;
use serde::Serialize;
use tokio::time::{Duration, sleep};
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Default, Serialize)]
struct Counter {
    count: i64,
}

type Ctx = Store<Counter>;

fn big_button(props: &ComponentProps<Ctx>, _: &Ctx) -> Node<Ctx> {
    let mut attrs = props.attrs.clone();
    attrs.insert("style", "font-size: 30px");
    Node::tag("button", attrs, props.children.clone())
}

fn hello(_: &ComponentProps<Ctx>, store: &Ctx) -> Node<Ctx> {
    let big_button = Component::new("BigButton", big_button);
    let plus = store.clone();
    let minus = store.clone();

    create_node(
        "section",
        None,
        children![
            create_node("h1", None, children!["Hello World from ", store.getter().count]),
            create_node(
                big_button.clone(),
                Some(Props::new().on("onClick", move |_| {
                    if let Err(err) = plus.commit("increment", ()) {
                        warn!(%err, "increment failed");
                    }
                })),
                children!["+"],
            ),
            create_node(
                big_button,
                Some(Props::new().on("onClick", move |_| {
                    if let Err(err) = minus.commit("decrement", ()) {
                        warn!(%err, "decrement failed");
                    }
                })),
                children!["-"],
            ),
        ],
    )
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut host = MemoryHost::new();
    let root = host.create_root("div");
    let store = Store::new(
        Counter::default(),
        Mutations::new()
            .with("increment", |s: &Counter, ()| Counter { count: s.count + 1 })
            .with("decrement", |s: &Counter, ()| Counter { count: s.count - 1 }),
    );
    let mut runtime = Runtime::new(
        host,
        root,
        store.clone(),
        Component::new("Hello", hello),
        RuntimeConfig::new(30),
    );

    // Commit a few times from outside while the runtime pumps frames
    let shutdown = CancellationToken::new();
    let stopper = shutdown.clone();
    let driver = async move {
        for _ in 0..3 {
            sleep(Duration::from_millis(100)).await;
            if let Err(err) = store.commit("increment", ()) {
                warn!(%err, "increment failed");
            }
        }
        sleep(Duration::from_millis(100)).await;
        stopper.cancel();
    };
    let (result, ()) = tokio::join!(runtime.run(shutdown), driver);
    result?;
    println!("{}", runtime.host().inner_html(root));

    // Click "-" and render the next frame by hand
    let section = runtime.host().children(root)[0];
    let minus = runtime.host().children(section)[2];
    runtime.dispatch(minus, "click")?;
    runtime.tick()?;
    println!("{}", runtime.host().inner_html(root));

    Ok(())
}
