//! Carbon Text Input Sources backend.
//!
//! HIToolbox asserts that TIS calls run on the main dispatch queue, so every
//! entry point funnels through [`on_main`]. Calls made on the main thread run
//! inline; calls from worker threads block on `dispatch_sync_f`.

use std::{ffi::c_void, ptr};

use autoinput_ids::InputSourceId;
use core_foundation::{
    array::{CFArrayGetCount, CFArrayGetValueAtIndex, CFArrayRef},
    base::{CFRelease, CFTypeRef, TCFType},
    dictionary::{CFDictionary, CFDictionaryRef},
    string::{CFString, CFStringRef},
};
use tracing::{debug, trace};

use crate::{
    Error, Filter, InputSourceHandle, InputSourceRegistry, Result, SwitchError, SwitchResult,
};

/// Opaque `TISInputSourceRef`.
type TisSourceRef = *const c_void;

/// `noErr`.
const NO_ERR: i32 = 0;

#[link(name = "Carbon", kind = "framework")]
unsafe extern "C" {
    fn TISCreateInputSourceList(properties: CFDictionaryRef, include_all: bool) -> CFArrayRef;
    fn TISCopyCurrentKeyboardInputSource() -> TisSourceRef;
    fn TISGetInputSourceProperty(source: TisSourceRef, key: CFStringRef) -> *const c_void;
    fn TISSelectInputSource(source: TisSourceRef) -> i32;

    static kTISPropertyInputSourceID: CFStringRef;
    static kTISPropertyLocalizedName: CFStringRef;
    static kTISPropertyInputSourceIsSelectCapable: CFStringRef;
    static kTISPropertyInputSourceIsEnabled: CFStringRef;
    static kTISPropertyInputModeID: CFStringRef;
    static kTISPropertyInputSourceCategory: CFStringRef;
}

#[link(name = "CoreFoundation", kind = "framework")]
unsafe extern "C" {
    fn CFBooleanGetValue(b: CFTypeRef) -> bool;
}

#[link(name = "System", kind = "dylib")]
unsafe extern "C" {
    /// Target of `dispatch_get_main_queue()`, which is a header-only inline.
    static _dispatch_main_q: c_void;
    fn dispatch_sync_f(queue: *const c_void, ctx: *mut c_void, work: unsafe extern "C" fn(*mut c_void));
    fn pthread_main_np() -> i32;
}

/// State carried through `dispatch_sync_f`'s context pointer.
struct MainCall<F, R> {
    /// Work to run; taken exactly once.
    f: Option<F>,
    /// Value produced by `f`.
    out: Option<R>,
}

/// Runs the queued closure on the main queue.
unsafe extern "C" fn main_call_trampoline<F, R>(ctx: *mut c_void)
where
    F: FnOnce() -> R,
{
    // SAFETY: ctx points at the MainCall owned by `on_main`, which blocks
    // until this function returns.
    let call = unsafe { &mut *ctx.cast::<MainCall<F, R>>() };
    if let Some(f) = call.f.take() {
        call.out = Some(f());
    }
}

/// Run `f` on the main thread and return its value.
fn on_main<F, R>(f: F) -> Option<R>
where
    F: FnOnce() -> R + Send,
    R: Send,
{
    if unsafe { pthread_main_np() } != 0 {
        return Some(f());
    }
    let mut call = MainCall { f: Some(f), out: None };
    unsafe {
        dispatch_sync_f(
            ptr::addr_of!(_dispatch_main_q),
            ptr::addr_of_mut!(call).cast::<c_void>(),
            main_call_trampoline::<F, R>,
        );
    }
    call.out
}

/// Read a CFString property; the OS keeps ownership (get rule).
unsafe fn string_prop(source: TisSourceRef, key: CFStringRef) -> Option<String> {
    let value = unsafe { TISGetInputSourceProperty(source, key) };
    if value.is_null() {
        return None;
    }
    let s = unsafe { CFString::wrap_under_get_rule(value as CFStringRef) };
    Some(s.to_string())
}

/// Read a CFBoolean property.
unsafe fn bool_prop(source: TisSourceRef, key: CFStringRef) -> Option<bool> {
    let value = unsafe { TISGetInputSourceProperty(source, key) };
    if value.is_null() {
        return None;
    }
    Some(unsafe { CFBooleanGetValue(value as CFTypeRef) })
}

/// Extract a typed handle, failing on the first missing required property.
unsafe fn read_handle(source: TisSourceRef) -> Result<InputSourceHandle> {
    unsafe {
        let id = string_prop(source, kTISPropertyInputSourceID)
            .ok_or(Error::MissingProperty("InputSourceID"))?;
        let display_name = string_prop(source, kTISPropertyLocalizedName)
            .ok_or(Error::MissingProperty("LocalizedName"))?;
        let is_selectable = bool_prop(source, kTISPropertyInputSourceIsSelectCapable)
            .ok_or(Error::MissingProperty("IsSelectCapable"))?;
        let is_enabled = bool_prop(source, kTISPropertyInputSourceIsEnabled)
            .ok_or(Error::MissingProperty("IsEnabled"))?;
        Ok(InputSourceHandle {
            id: InputSourceId::new(id),
            display_name,
            is_selectable,
            is_enabled,
            input_mode_id: string_prop(source, kTISPropertyInputModeID),
            category: string_prop(source, kTISPropertyInputSourceCategory),
        })
    }
}

/// Owned `CFArrayRef` of input sources, released on drop.
struct SourceList(CFArrayRef);

impl SourceList {
    /// Create a list, optionally narrowed to one identifier.
    fn create(id: Option<&InputSourceId>, include_all: bool) -> Result<Self> {
        let filter = id.map(|id| {
            let key = unsafe { CFString::wrap_under_get_rule(kTISPropertyInputSourceID) };
            let value = CFString::new(id.as_str());
            CFDictionary::from_CFType_pairs(&[(key.as_CFType(), value.as_CFType())])
        });
        let props = filter
            .as_ref()
            .map_or(ptr::null(), |d| d.as_concrete_TypeRef());
        let arr = unsafe { TISCreateInputSourceList(props, include_all) };
        if arr.is_null() {
            return Err(Error::ListUnavailable);
        }
        Ok(Self(arr))
    }

    fn len(&self) -> isize {
        unsafe { CFArrayGetCount(self.0) }
    }

    fn get(&self, idx: isize) -> TisSourceRef {
        unsafe { CFArrayGetValueAtIndex(self.0, idx) }
    }
}

impl Drop for SourceList {
    fn drop(&mut self) {
        unsafe { CFRelease(self.0 as CFTypeRef) };
    }
}

/// Registry backed by the Carbon TIS API.
#[derive(Debug, Default, Clone, Copy)]
pub struct TisRegistry;

impl TisRegistry {
    /// Create the registry; it holds no state, each call queries the OS.
    pub fn new() -> Self {
        Self
    }
}

impl InputSourceRegistry for TisRegistry {
    fn list_input_sources(&self, filter: Filter) -> Result<Vec<InputSourceHandle>> {
        on_main(|| {
            let list = SourceList::create(None, filter.include_disabled)?;
            let mut out = Vec::new();
            for i in 0..list.len() {
                let src = list.get(i);
                if src.is_null() {
                    continue;
                }
                match unsafe { read_handle(src) } {
                    Ok(h) if filter.matches(&h) => out.push(h),
                    Ok(_) => {}
                    Err(e) => debug!(index = i, "skipping input source: {}", e),
                }
            }
            trace!(count = out.len(), "listed input sources");
            Ok(out)
        })
        .unwrap_or(Err(Error::ListUnavailable))
    }

    fn find(&self, id: &InputSourceId) -> Result<InputSourceHandle> {
        on_main(|| {
            let list = SourceList::create(Some(id), false)?;
            for i in 0..list.len() {
                let src = list.get(i);
                if src.is_null() {
                    continue;
                }
                let h = unsafe { read_handle(src) }?;
                if &h.id == id {
                    return Ok(h);
                }
            }
            Err(Error::NotFound(id.clone()))
        })
        .unwrap_or(Err(Error::ListUnavailable))
    }

    fn current_input_source(&self) -> Result<InputSourceHandle> {
        on_main(|| {
            let src = unsafe { TISCopyCurrentKeyboardInputSource() };
            if src.is_null() {
                return Err(Error::UnknownState);
            }
            let h = unsafe { read_handle(src) };
            unsafe { CFRelease(src as CFTypeRef) };
            h.map_err(|e| {
                debug!("current input source unreadable: {}", e);
                Error::UnknownState
            })
        })
        .unwrap_or(Err(Error::UnknownState))
    }

    fn os_select(&self, handle: &InputSourceHandle) -> SwitchResult {
        let id = &handle.id;
        on_main(|| {
            let list = SourceList::create(Some(id), false)
                .map_err(|_| SwitchError::Vanished(id.clone()))?;
            if list.len() == 0 {
                return Err(SwitchError::Vanished(id.clone()));
            }
            let src = list.get(0);
            if src.is_null() {
                return Err(SwitchError::Vanished(id.clone()));
            }
            let status = unsafe { TISSelectInputSource(src) };
            if status != NO_ERR {
                return Err(SwitchError::OsRejected {
                    id: id.clone(),
                    code: status,
                });
            }
            Ok(())
        })
        .unwrap_or(Err(SwitchError::Vanished(id.clone())))
    }
}
