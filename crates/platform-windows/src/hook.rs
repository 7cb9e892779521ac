//! `WH_KEYBOARD_LL` keyboard capture.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;

use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, PeekMessageW, PostThreadMessageW,
    SetWindowsHookExW, TranslateMessage, UnhookWindowsHookEx, KBDLLHOOKSTRUCT, MSG, PM_NOREMOVE,
    WH_KEYBOARD_LL, WM_KEYDOWN, WM_KEYUP, WM_QUIT, WM_SYSKEYDOWN, WM_SYSKEYUP, WM_USER,
};

use mousekeys_common::error::{MouseKeysError, MouseKeysResult};
use mousekeys_platform_core::{event_queue, CaptureContext, EventSink, EventSource, KeyboardCapture};

use crate::registry::{registry, HookContext};

pub struct LowLevelHookCapture {
    ctx: CaptureContext,
    sink: Option<EventSink>,
    /// Win32 id of the hook thread (for `PostThreadMessageW`) and its handle.
    hook_thread: Option<(u32, JoinHandle<()>)>,
}

impl LowLevelHookCapture {
    pub fn new(ctx: CaptureContext) -> Self {
        Self {
            ctx,
            sink: None,
            hook_thread: None,
        }
    }
}

impl KeyboardCapture for LowLevelHookCapture {
    fn start(&mut self) -> MouseKeysResult<EventSource> {
        if self.hook_thread.is_some() {
            return Err(MouseKeysError::capture("keyboard hook already installed"));
        }

        let (sink, source) = event_queue(self.ctx.queue_capacity());
        let context = Arc::new(HookContext::new(sink.clone(), self.ctx.clone()));
        let (ready_tx, ready_rx) = mpsc::channel();

        let handle = std::thread::Builder::new()
            .name("mousekeys-keyboard-hook".into())
            .spawn(move || run_hook(context, ready_tx))?;

        match ready_rx.recv() {
            Ok(Ok(thread_id)) => {
                tracing::info!(thread_id, "Keyboard capture started (WH_KEYBOARD_LL)");
                self.sink = Some(sink);
                self.hook_thread = Some((thread_id, handle));
                Ok(source)
            }
            Ok(Err(message)) => {
                let _ = handle.join();
                Err(MouseKeysError::capture_unavailable(message))
            }
            Err(_) => {
                let _ = handle.join();
                Err(MouseKeysError::capture_unavailable(
                    "keyboard hook thread exited during setup",
                ))
            }
        }
    }

    fn stop(&mut self) -> MouseKeysResult<()> {
        if let Some(sink) = self.sink.take() {
            sink.close();
        }
        let Some((thread_id, handle)) = self.hook_thread.take() else {
            return Ok(());
        };

        unsafe { PostThreadMessageW(thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) }.map_err(|e| {
            MouseKeysError::platform(format!("Failed to post WM_QUIT to hook thread: {e}"))
        })?;
        handle
            .join()
            .map_err(|_| MouseKeysError::capture("keyboard hook thread panicked"))?;
        tracing::info!("Keyboard capture stopped");
        Ok(())
    }

    fn name(&self) -> &str {
        "win32-ll-hook"
    }

    fn is_running(&self) -> bool {
        self.hook_thread.is_some()
    }
}

impl Drop for LowLevelHookCapture {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::warn!(error = %e, "Failed to stop keyboard hook cleanly");
        }
    }
}

fn run_hook(context: Arc<HookContext>, ready: mpsc::Sender<Result<u32, String>>) {
    let thread = std::thread::current().id();
    registry().register(thread, context);

    // Make sure the thread has a message queue before anyone posts to it.
    unsafe {
        let mut msg = MSG::default();
        let _ = PeekMessageW(&mut msg, None, WM_USER, WM_USER, PM_NOREMOVE);
    }

    let hook = match unsafe { SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_proc), None, 0) } {
        Ok(hook) => hook,
        Err(e) => {
            registry().unregister(thread);
            let _ = ready.send(Err(format!("Failed to install keyboard hook: {e}")));
            return;
        }
    };

    let thread_id = unsafe { GetCurrentThreadId() };
    if ready.send(Ok(thread_id)).is_ok() {
        unsafe {
            let mut msg = MSG::default();
            loop {
                let result = GetMessageW(&mut msg, None, 0, 0);
                if result.0 == 0 || result.0 == -1 {
                    break;
                }
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
    }

    if let Err(e) = unsafe { UnhookWindowsHookEx(hook) } {
        tracing::warn!(error = %e, "UnhookWindowsHookEx failed");
    }
    registry().unregister(thread);
}

unsafe extern "system" fn keyboard_proc(code: i32, w_param: WPARAM, l_param: LPARAM) -> LRESULT {
    if code < 0 {
        return CallNextHookEx(None, code, w_param, l_param);
    }

    let down = match w_param.0 as u32 {
        WM_KEYDOWN | WM_SYSKEYDOWN => true,
        WM_KEYUP | WM_SYSKEYUP => false,
        _ => return CallNextHookEx(None, code, w_param, l_param),
    };
    let kb_struct = &*(l_param.0 as *const KBDLLHOOKSTRUCT);

    if let Some(context) = registry().lookup(std::thread::current().id()) {
        if context.handle(kb_struct.vkCode, down) {
            return LRESULT(1);
        }
    }

    CallNextHookEx(None, code, w_param, l_param)
}
