//! Wire types shared by the harness server and its clients.
//!
//! The harness speaks JSONL: every request is one JSON object on one line,
//! tagged by `operation`, and every response is one JSON object on one line,
//! tagged by `kind`. Arguments, results, and context state travel as JSON
//! text embedded in string fields so that each runtime under test decodes
//! them with its own native JSON library.
//!
//! ```json
//! {"operation":"invoke_method","method_name":"add","arguments":"{\"a\":2,\"b\":3}"}
//! {"kind":"invoke_method","success":true,"result":"5","metadata":{"execution_time_us":4,"runtime":"rust"}}
//! ```

mod describe;
mod request;
mod response;

pub use describe::{DescribeResponse, OperationDescriptor, SERVICE_NAME};
pub use request::{
    CreateContextRequest, DestroyContextRequest, InspectStateRequest, InvokeMethodRequest,
    ListMethodsRequest, Request,
};
pub use response::{
    CreateContextResponse, DestroyContextResponse, ExecutionMetadata, InspectStateResponse,
    InvokeMethodResponse, ListMethodsResponse, MethodInfo, RejectedResponse, Response,
};
