// Code generated by pinbridge for package shapes (example.com/shapes). DO NOT EDIT.

#![allow(non_snake_case, non_camel_case_types, unused_imports, unused_unsafe, clippy::all)]

use std::os::raw::c_char;

use pinbridge_runtime::{ffi, host_ref, registry, Handle, HostRef};

/// Bridge_init must run before any other wrapper in this library.
#[no_mangle]
pub extern "C" fn Bridge_init() {
    pinbridge_runtime::init();
}

/// Handle to a crate::shapes::S.
pub type Bridge_shapes_S = Handle;

/// Bridge_shapes_S_getter_1 wraps crate::shapes::S.F.
#[no_mangle]
pub extern "C" fn Bridge_shapes_S_getter_1(self_: Handle) -> isize {
    let recv = registry().resolve::<crate::shapes::S>(self_);
    let ret = recv.read().F.clone();
    ret
}

/// Bridge_shapes_S_setter_1 wraps crate::shapes::S.F.
#[no_mangle]
pub extern "C" fn Bridge_shapes_S_setter_1(self_: Handle, val: isize) {
    let recv = registry().resolve::<crate::shapes::S>(self_);
    recv.write().F = val;
}

/// Bridge_shapes_S_getter_2 wraps crate::shapes::S.P.
#[no_mangle]
pub extern "C" fn Bridge_shapes_S_getter_2(self_: Handle) -> Handle {
    let recv = registry().resolve::<crate::shapes::S>(self_);
    let ret = recv.read().P.clone();
    registry().wrap(ret)
}

/// Bridge_shapes_S_setter_2 wraps crate::shapes::S.P.
#[no_mangle]
pub extern "C" fn Bridge_shapes_S_setter_2(self_: Handle, val: Handle) {
    let recv = registry().resolve::<crate::shapes::S>(self_);
    let val = registry().resolve::<crate::shapes::T>(val);
    recv.write().P = val;
}

/// Bridge_shapes_S_Swap wraps crate::shapes::S::Swap.
#[no_mangle]
pub extern "C" fn Bridge_shapes_S_Swap(self_: Handle, next: Handle) -> Handle {
    let recv = registry().resolve::<crate::shapes::S>(self_);
    let next = registry().resolve::<crate::shapes::T>(next);
    let _r0 = crate::shapes::S::Swap(&recv, next);
    registry().wrap(_r0)
}

/// Bridge_shapes_S_new wraps crate::shapes::S::default.
#[no_mangle]
pub extern "C" fn Bridge_shapes_S_new() -> Handle {
    let obj: HostRef<crate::shapes::S> = host_ref(crate::shapes::S::default());
    registry().wrap(obj)
}

/// Handle to a crate::shapes::T.
pub type Bridge_shapes_T = Handle;

/// Bridge_shapes_T_getter_1 wraps crate::shapes::T.Tag.
#[no_mangle]
pub extern "C" fn Bridge_shapes_T_getter_1(self_: Handle) -> isize {
    let recv = registry().resolve::<crate::shapes::T>(self_);
    let ret = recv.read().Tag.clone();
    ret
}

/// Bridge_shapes_T_setter_1 wraps crate::shapes::T.Tag.
#[no_mangle]
pub extern "C" fn Bridge_shapes_T_setter_1(self_: Handle, val: isize) {
    let recv = registry().resolve::<crate::shapes::T>(self_);
    recv.write().Tag = val;
}

/// Bridge_shapes_T_new wraps crate::shapes::T::default.
#[no_mangle]
pub extern "C" fn Bridge_shapes_T_new() -> Handle {
    let obj: HostRef<crate::shapes::T> = host_ref(crate::shapes::T::default());
    registry().wrap(obj)
}

/// Handle to a crate::shapes::Point.
pub type Bridge_shapes_Point = Handle;

/// Bridge_shapes_Point_getter_1 wraps crate::shapes::Point.X.
#[no_mangle]
pub extern "C" fn Bridge_shapes_Point_getter_1(self_: Handle) -> f64 {
    let recv = registry().resolve::<crate::shapes::Point>(self_);
    let ret = recv.read().X.clone();
    ret
}

/// Bridge_shapes_Point_setter_1 wraps crate::shapes::Point.X.
#[no_mangle]
pub extern "C" fn Bridge_shapes_Point_setter_1(self_: Handle, val: f64) {
    let recv = registry().resolve::<crate::shapes::Point>(self_);
    recv.write().X = val;
}

/// Bridge_shapes_Point_getter_2 wraps crate::shapes::Point.Err.
#[no_mangle]
pub extern "C" fn Bridge_shapes_Point_getter_2(self_: Handle) -> *mut c_char {
    let recv = registry().resolve::<crate::shapes::Point>(self_);
    let ret = recv.read().Err.clone();
    ffi::error_into_raw(ret)
}

/// Bridge_shapes_Point_setter_2 wraps crate::shapes::Point.Err.
#[no_mangle]
pub extern "C" fn Bridge_shapes_Point_setter_2(self_: Handle, val: *const c_char) {
    let recv = registry().resolve::<crate::shapes::Point>(self_);
    let val = unsafe { ffi::error_from_raw(val) };
    recv.write().Err = val;
}

/// Bridge_shapes_Point_Dist wraps crate::shapes::Point::Dist.
#[no_mangle]
pub extern "C" fn Bridge_shapes_Point_Dist(self_: Handle, q: Handle) -> f64 {
    let recv = registry().resolve::<crate::shapes::Point>(self_);
    let q = registry().resolve::<crate::shapes::Point>(q);
    let _r0 = crate::shapes::Point::Dist(&recv, q);
    _r0
}

/// Bridge_shapes_Point_new wraps crate::shapes::Point::default.
#[no_mangle]
pub extern "C" fn Bridge_shapes_Point_new() -> Handle {
    let obj: HostRef<crate::shapes::Point> = host_ref(crate::shapes::Point::default());
    registry().wrap(obj)
}

/// Bridge_shapes_NewT wraps crate::shapes::NewT.
#[no_mangle]
pub extern "C" fn Bridge_shapes_NewT(tag: isize) -> Handle {
    let _r0 = crate::shapes::NewT(tag);
    registry().wrap(_r0)
}

#[repr(C)]
pub struct Bridge_shapes_Parse_Result {
    pub r0: isize,
    pub r1: *mut c_char,
}

/// Bridge_shapes_Parse wraps crate::shapes::Parse.
#[no_mangle]
pub extern "C" fn Bridge_shapes_Parse(text: *const c_char) -> Bridge_shapes_Parse_Result {
    let text = unsafe { ffi::string_from_raw(text) };
    let (_r0, _r1) = crate::shapes::Parse(text);
    let r0 = _r0;
    let r1 = ffi::error_into_raw(_r1);
    Bridge_shapes_Parse_Result { r0, r1 }
}

/// Bridge_get_shapes_Version wraps crate::shapes::Version.
#[no_mangle]
pub extern "C" fn Bridge_get_shapes_Version() -> *mut c_char {
    ffi::string_into_raw(String::from(crate::shapes::Version))
}

/// Bridge_get_shapes_EOF wraps crate::shapes::EOF.
#[no_mangle]
pub extern "C" fn Bridge_get_shapes_EOF() -> *mut c_char {
    let ret = crate::shapes::EOF.read().clone();
    ffi::error_into_raw(ret)
}

/// Bridge_set_shapes_EOF wraps crate::shapes::EOF.
#[no_mangle]
pub extern "C" fn Bridge_set_shapes_EOF(val: *const c_char) {
    let val = unsafe { ffi::error_from_raw(val) };
    *crate::shapes::EOF.write() = val;
}
