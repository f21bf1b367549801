use routeplan::{Captures, Router, Target};

use hyper::header::UPGRADE;
use hyper::service::Service;
use hyper::{Body, Method, Request, Response, StatusCode};

async fn hello(req: Request<Body>) -> Result<Response<Body>, hyper::Error> {
    let captures = req.extensions().get::<Captures>().unwrap();
    let user = captures.str("user").unwrap_or("stranger");
    Ok(Response::new(format!("Hello, {}", user).into()))
}

async fn list(req: Request<Body>) -> Result<Response<Body>, hyper::Error> {
    let captures = req.extensions().get::<Captures>().unwrap();
    let body = format!(
        "{}#{}",
        captures.str("controller").unwrap(),
        captures.str("action").unwrap()
    );
    Ok(Response::new(body.into()))
}

async fn stream(_: Request<Body>) -> Result<Response<Body>, hyper::Error> {
    Ok(Response::builder()
        .status(StatusCode::SWITCHING_PROTOCOLS)
        .body(Body::empty())
        .unwrap())
}

async fn missing(_: Request<Body>) -> Result<Response<Body>, hyper::Error> {
    Ok(Response::builder()
        .status(StatusCode::NOT_FOUND)
        .body("nothing here".into())
        .unwrap())
}

fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body(res: Response<Body>) -> String {
    let bytes = hyper::body::to_bytes(res.into_body()).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn handler_targets() {
    let mut router = Router::new();
    router.root().get("/hello/:user").to(Target::handler(hello));

    let res = router.serve(request(Method::GET, "/hello/gordon")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body(res).await, "Hello, gordon");
}

#[tokio::test]
async fn controller_targets() {
    let mut router = Router::new();
    router.root().get("/users").to("users#list");
    router.root().get("/reports").to("reports#list");
    router.add_action("users", "list", list);

    let res = router.serve(request(Method::GET, "/users")).await.unwrap();
    assert_eq!(body(res).await, "users#list");

    // routed, but nothing registered for reports#list
    let res = router.serve(request(Method::GET, "/reports")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn not_found() {
    let mut router = Router::new();
    router.root().get("/").to(Target::handler(hello));

    let res = router.serve(request(Method::GET, "/nope")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = router.serve(request(Method::POST, "/")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn custom_not_found() {
    let mut router = Router::new().not_found(missing);
    router.root().get("/").to(Target::handler(hello));

    let res = router.serve(request(Method::GET, "/nope")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body(res).await, "nothing here");
}

#[tokio::test]
async fn head_is_routed_like_get() {
    let mut router = Router::new();
    router.root().get("/hello/:user").to(Target::handler(hello));

    let res = router.serve(request(Method::HEAD, "/hello/alyx")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn upgrades() {
    let mut router = Router::new();
    router.root().websocket("/events").to(Target::handler(stream));
    router.root().get("/events").to(Target::handler(hello));

    let upgrade = Request::builder()
        .uri("/events")
        .header(UPGRADE, "websocket")
        .body(Body::empty())
        .unwrap();
    let res = router.serve(upgrade).await.unwrap();
    assert_eq!(res.status(), StatusCode::SWITCHING_PROTOCOLS);

    let res = router.serve(request(Method::GET, "/events")).await.unwrap();
    assert_eq!(body(res).await, "Hello, stranger");
}

#[tokio::test]
async fn as_a_service() {
    let mut router = Router::new();
    router.root().get("/hello/:user").to(Target::handler(hello));

    let mut make = router.into_service();
    let mut service = make.call(()).await.unwrap();

    let res = service.call(request(Method::GET, "/hello/barney")).await.unwrap();
    assert_eq!(body(res).await, "Hello, barney");
}
