pub mod otp;

pub use otp::{
    OtpFailure, OtpStatsQuery, SendOtpRequest, SendOtpResponse, VerifyOtpRequest,
    VerifyOtpResponse,
};
