//! End-to-end request handling over real sockets.

use std::io::{BufRead, BufReader, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use harness_config::SocketEndpoint;
use harness_protocol::{
    CreateContextRequest, DestroyContextRequest, InspectStateRequest, InvokeMethodRequest,
    ListMethodsRequest, Request, Response,
};
use rstest::{fixture, rstest};

use super::support::{JsonlClient, dispatcher_with};
use crate::dispatch::{DispatchConnectionHandler, DispatchOptions};
use crate::transport::SocketListener;

/// A listener serving the built-in modules on an ephemeral TCP port.
struct ServingWorld {
    address: std::net::SocketAddr,
    stop: Option<Box<dyn FnOnce()>>,
}

impl ServingWorld {
    fn connect(&self) -> JsonlClient<TcpStream> {
        let stream = TcpStream::connect(self.address).expect("connect to listener");
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .expect("set read timeout");
        let reader = stream.try_clone().expect("clone stream");
        JsonlClient::new(reader, stream)
    }
}

impl Drop for ServingWorld {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            stop();
        }
    }
}

#[fixture]
fn world() -> ServingWorld {
    let listener =
        SocketListener::bind(&SocketEndpoint::tcp("127.0.0.1", 0)).expect("bind tcp listener");
    let address = listener.local_addr().expect("listener address");
    let dispatcher = Arc::new(dispatcher_with(DispatchOptions::default()));
    let handle = listener
        .start(Arc::new(DispatchConnectionHandler::new(dispatcher)))
        .expect("start listener");
    ServingWorld {
        address,
        stop: Some(Box::new(move || {
            let _ = handle.drain(Duration::from_secs(1));
        })),
    }
}

fn created_id(response: Response) -> String {
    match response {
        Response::CreateContext(reply) => reply.context_id.expect("context id"),
        other => panic!("expected create_context reply, got {other:?}"),
    }
}

#[rstest]
fn full_session_lifecycle_over_one_connection(world: ServingWorld) {
    let mut client = world.connect();

    let context = created_id(client.request(&Request::CreateContext(CreateContextRequest {
        initial_state: Some(r#"{"counter": 10}"#.to_owned()),
    })));

    for expected in ["11", "12"] {
        let reply = client.request(&Request::InvokeMethod(
            InvokeMethodRequest::new("counter_increment", "{}").in_context(&context),
        ));
        let Response::InvokeMethod(invoked) = reply else {
            panic!("expected invoke_method reply, got {reply:?}");
        };
        assert_eq!(invoked.result.as_deref(), Some(expected));
    }

    let inspected = client.request(&Request::InspectState(InspectStateRequest {
        context_id: context.clone(),
    }));
    assert!(
        matches!(&inspected, Response::InspectState(reply) if reply.state.as_deref() == Some(r#"{"counter":12}"#)),
        "{inspected:?}"
    );

    let destroyed = client.request(&Request::DestroyContext(DestroyContextRequest {
        context_id: context.clone(),
    }));
    assert!(matches!(destroyed, Response::DestroyContext(reply) if reply.success));

    let gone = client.request(&Request::InspectState(InspectStateRequest {
        context_id: context.clone(),
    }));
    let expected = format!("Context not found: {context}");
    assert!(
        matches!(&gone, Response::InspectState(reply) if reply.error.as_deref() == Some(expected.as_str())),
        "{gone:?}"
    );
}

#[rstest]
fn contexts_are_shared_across_connections(world: ServingWorld) {
    let mut first = world.connect();
    let mut second = world.connect();

    let context = created_id(first.request(&Request::CreateContext(
        CreateContextRequest::default(),
    )));
    first.request(&Request::InvokeMethod(
        InvokeMethodRequest::new("counter_increment", "{}").in_context(&context),
    ));

    let reply = second.request(&Request::InvokeMethod(
        InvokeMethodRequest::new("counter_get", "{}").in_context(&context),
    ));
    assert!(
        matches!(&reply, Response::InvokeMethod(invoked) if invoked.result.as_deref() == Some("1")),
        "{reply:?}"
    );
}

#[rstest]
#[case::not_json("this is not json", "malformed request")]
#[case::unknown_operation(r#"{"operation":"reboot"}"#, "malformed request")]
#[case::missing_field(r#"{"operation":"inspect_state"}"#, "malformed request")]
fn malformed_lines_are_rejected_and_the_connection_survives(
    world: ServingWorld,
    #[case] line: &str,
    #[case] prefix: &str,
) {
    let mut client = world.connect();

    let rejected = client.send_line(line);
    let Response::Rejected(rejection) = rejected else {
        panic!("expected rejection, got {rejected:?}");
    };
    assert!(rejection.error.starts_with(prefix), "{}", rejection.error);

    let listed = client.request(&Request::ListMethods(ListMethodsRequest {
        prefix: Some("counter_".to_owned()),
    }));
    assert!(matches!(listed, Response::ListMethods(reply) if reply.methods.len() == 3));
}

#[rstest]
fn failing_invocations_do_not_close_the_connection(world: ServingWorld) {
    let mut client = world.connect();

    let failed = client.request(&Request::InvokeMethod(InvokeMethodRequest::new(
        "divide",
        r#"{"a": 1, "b": 0}"#,
    )));
    assert!(
        matches!(&failed, Response::InvokeMethod(reply) if reply.error.as_deref() == Some("division by zero")),
        "{failed:?}"
    );

    let succeeded = client.request(&Request::InvokeMethod(InvokeMethodRequest::new(
        "divide",
        r#"{"a": 9, "b": 3}"#,
    )));
    assert!(
        matches!(&succeeded, Response::InvokeMethod(reply) if reply.result.as_deref() == Some("3")),
        "{succeeded:?}"
    );
}

#[rstest]
fn empty_context_id_on_the_wire_runs_without_a_context(world: ServingWorld) {
    let mut client = world.connect();

    let reply = client.send_line(
        r#"{"operation":"invoke_method","method_name":"counter_increment","context_id":""}"#,
    );
    assert!(
        matches!(&reply, Response::InvokeMethod(invoked) if invoked.result.as_deref() == Some("1")),
        "{reply:?}"
    );
}

#[rstest]
fn pipelined_requests_are_answered_in_order(world: ServingWorld) {
    let mut stream = TcpStream::connect(world.address).expect("connect to listener");
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("set read timeout");
    let batch = [
        r#"{"operation":"invoke_method","method_name":"add","arguments":"{\"a\":1,\"b\":1}"}"#,
        r#"{"operation":"invoke_method","method_name":"fibonacci","arguments":"{\"n\":7}"}"#,
        r#"{"operation":"invoke_method","method_name":"nope"}"#,
        r#"{"operation":"describe"}"#,
    ]
    .join("\n");
    stream
        .write_all(format!("{batch}\n").as_bytes())
        .expect("write batch");
    stream.shutdown(Shutdown::Write).expect("close write half");

    let replies: Vec<Response> = BufReader::new(stream)
        .lines()
        .map(|line| serde_json::from_str(&line.expect("read line")).expect("response is JSON"))
        .collect();

    assert_eq!(replies.len(), 4);
    let results: Vec<Option<&str>> = replies
        .iter()
        .take(3)
        .map(|reply| match reply {
            Response::InvokeMethod(invoked) => invoked
                .result
                .as_deref()
                .or(invoked.error.as_deref()),
            _ => None,
        })
        .collect();
    assert_eq!(
        results,
        [Some("2"), Some("13"), Some("Method not found: nope")]
    );
    assert!(matches!(replies.last(), Some(Response::Describe(_))));
}

#[cfg(unix)]
#[test]
fn serves_requests_over_unix_sockets() {
    use std::os::unix::net::UnixStream;

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("harness.sock");
    let endpoint = SocketEndpoint::unix(path.to_str().expect("utf-8 path"));
    let listener = SocketListener::bind(&endpoint).expect("bind unix listener");
    let dispatcher = Arc::new(dispatcher_with(DispatchOptions::default()));
    let handle = listener
        .start(Arc::new(DispatchConnectionHandler::new(dispatcher)))
        .expect("start listener");

    let stream = UnixStream::connect(&path).expect("connect unix socket");
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("set read timeout");
    let mut client = JsonlClient::new(stream.try_clone().expect("clone stream"), stream);
    let reply = client.request(&Request::InvokeMethod(InvokeMethodRequest::new(
        "is_prime",
        r#"{"n": 7919}"#,
    )));
    assert!(
        matches!(&reply, Response::InvokeMethod(invoked) if invoked.result.as_deref() == Some("true")),
        "{reply:?}"
    );

    drop(client);
    handle
        .drain(Duration::from_secs(1))
        .expect("drain unix listener");
    assert!(!path.exists(), "socket file should be removed on shutdown");
}
